use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::member_invoices;

#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = member_invoices)]
pub struct MemberInvoiceEntity {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub member_id: Uuid,
    pub membership_plan_id: Uuid,
    pub amount_minor: i32,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = member_invoices)]
pub struct InsertMemberInvoiceEntity {
    pub gym_id: Uuid,
    pub member_id: Uuid,
    pub membership_plan_id: Uuid,
    pub amount_minor: i32,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub status: String,
}
