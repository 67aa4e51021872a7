use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::member_payments;

#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = member_payments)]
pub struct MemberPaymentEntity {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub invoice_id: Uuid,
    pub member_id: Uuid,
    pub amount_minor: i32,
    pub method: String,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = member_payments)]
pub struct InsertMemberPaymentEntity {
    pub gym_id: Uuid,
    pub invoice_id: Uuid,
    pub member_id: Uuid,
    pub amount_minor: i32,
    pub method: String,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
}
