use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::entities::gym_subscriptions::GymSubscriptionEntity,
    infra::db::postgres::schema::gateway_orders,
};

/// A payment-gateway order for a platform subscription purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = gateway_orders)]
pub struct GatewayOrderEntity {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub plan_id: Uuid,
    pub kind: String,
    pub amount_minor: i32,
    pub credit_minor: i32,
    pub currency: String,
    pub gateway_order_id: String,
    pub receipt: String,
    pub status: String,
    pub gateway_payment_id: Option<String>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = gateway_orders)]
pub struct InsertGatewayOrderEntity {
    pub gym_id: Uuid,
    pub plan_id: Uuid,
    pub kind: String,
    pub amount_minor: i32,
    pub credit_minor: i32,
    pub currency: String,
    pub gateway_order_id: String,
    pub receipt: String,
    pub status: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

/// A paid order together with the subscription row it activated.
#[derive(Debug, Clone, PartialEq)]
pub struct SettledOrder {
    pub order: GatewayOrderEntity,
    pub subscription: GymSubscriptionEntity,
}
