use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::gateway_orders::GatewayOrderEntity;
use crate::domain::value_objects::{
    enums::{order_kinds::OrderKind, subscription_statuses::SubscriptionStatus},
    saas_plans::SaasPlanDto,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurrentSubscriptionDto {
    pub plan: SaasPlanDto,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub grace_ends_at: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub scheduled_plan_id: Option<Uuid>,
    pub days_remaining: i64,
    pub access_granted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub plan_id: Uuid,
}

/// Result of an order request: either a gateway order to pay, or a
/// downgrade recorded for the end of the current period.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CreateOrderResponse {
    OrderCreated {
        order_id: Uuid,
        gateway_order_id: String,
        kind: OrderKind,
        amount_minor: i32,
        credit_minor: i32,
        currency: String,
        key_id: String,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    },
    DowngradeScheduled {
        scheduled_plan_id: Uuid,
        effective_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GatewayOrderDto {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub kind: String,
    pub amount_minor: i32,
    pub credit_minor: i32,
    pub currency: String,
    pub gateway_order_id: String,
    pub status: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<GatewayOrderEntity> for GatewayOrderDto {
    fn from(value: GatewayOrderEntity) -> Self {
        Self {
            id: value.id,
            plan_id: value.plan_id,
            kind: value.kind,
            amount_minor: value.amount_minor,
            credit_minor: value.credit_minor,
            currency: value.currency,
            gateway_order_id: value.gateway_order_id,
            status: value.status,
            period_start: value.period_start,
            period_end: value.period_end,
            created_at: value.created_at,
            paid_at: value.paid_at,
        }
    }
}

/// Outcome of a webhook delivery, reported back to the gateway as JSON.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Processed,
    Duplicate,
    Ignored,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ExpirySweepReport {
    pub canceled: usize,
    pub moved_to_grace: usize,
    pub expired: usize,
    pub expiring_notices: usize,
}
