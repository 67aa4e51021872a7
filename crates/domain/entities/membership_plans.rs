use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::membership_plans;

#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = membership_plans)]
pub struct MembershipPlanEntity {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_minor: i32,
    pub duration_days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = membership_plans)]
pub struct InsertMembershipPlanEntity {
    pub gym_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_minor: i32,
    pub duration_days: i32,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = membership_plans)]
pub struct UpdateMembershipPlanEntity {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_minor: Option<i32>,
    pub duration_days: Option<i32>,
    pub is_active: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}
