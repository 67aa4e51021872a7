use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::expenses;

#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = expenses)]
pub struct ExpenseEntity {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub category: String,
    pub amount_minor: i32,
    pub spent_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = expenses)]
pub struct InsertExpenseEntity {
    pub gym_id: Uuid,
    pub category: String,
    pub amount_minor: i32,
    pub spent_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_by: Uuid,
}
