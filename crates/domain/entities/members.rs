use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::members;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = members)]
pub struct MemberEntity {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub membership_plan_id: Option<Uuid>,
    pub membership_start: Option<DateTime<Utc>>,
    pub membership_end: Option<DateTime<Utc>>,
    pub status: String,
    pub joined_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = members)]
pub struct InsertMemberEntity {
    pub gym_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub membership_plan_id: Option<Uuid>,
    pub status: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = members)]
pub struct UpdateMemberEntity {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub membership_plan_id: Option<Uuid>,
    pub membership_start: Option<DateTime<Utc>>,
    pub membership_end: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
