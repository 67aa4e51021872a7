use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::attendance;

/// One gym visit. A visit with no `check_out_at` is still open.
#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = attendance)]
pub struct VisitEntity {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub member_id: Uuid,
    pub check_in_at: DateTime<Utc>,
    pub check_out_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = attendance)]
pub struct InsertVisitEntity {
    pub gym_id: Uuid,
    pub member_id: Uuid,
    pub check_in_at: DateTime<Utc>,
}
