use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::gym_subscriptions;

/// The platform subscription of one gym. There is at most one row per gym.
#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = gym_subscriptions)]
pub struct GymSubscriptionEntity {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub plan_id: Uuid,
    pub status: String,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub grace_ends_at: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub scheduled_plan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = gym_subscriptions)]
pub struct InsertGymSubscriptionEntity {
    pub gym_id: Uuid,
    pub plan_id: Uuid,
    pub status: String,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
}

/// Changes applied when a subscription moves between statuses.
/// `Some(None)` on a nullable column writes NULL.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = gym_subscriptions)]
pub struct SubscriptionTransitionEntity {
    pub status: String,
    pub plan_id: Option<Uuid>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub grace_ends_at: Option<Option<DateTime<Utc>>>,
    pub cancel_at_period_end: Option<bool>,
    pub scheduled_plan_id: Option<Option<Uuid>>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionTransitionEntity {
    pub fn to_status(status: &str, now: DateTime<Utc>) -> Self {
        Self {
            status: status.to_string(),
            plan_id: None,
            current_period_start: None,
            current_period_end: None,
            grace_ends_at: None,
            cancel_at_period_end: None,
            scheduled_plan_id: None,
            updated_at: now,
        }
    }
}
