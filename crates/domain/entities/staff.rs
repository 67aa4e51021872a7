use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::staff;

#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = staff)]
pub struct StaffEntity {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: String,
    pub salary_minor: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = staff)]
pub struct InsertStaffEntity {
    pub gym_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: String,
    pub salary_minor: i32,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = staff)]
pub struct UpdateStaffEntity {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub salary_minor: Option<i32>,
    pub updated_at: Option<DateTime<Utc>>,
}
