use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::gym_subscriptions::{GymSubscriptionEntity, SubscriptionTransitionEntity},
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};

#[automock]
#[async_trait]
pub trait GymSubscriptionRepository {
    async fn find_by_gym(&self, gym_id: Uuid) -> Result<Option<GymSubscriptionEntity>>;

    /// Applies `changes` only while the row still has status `from`.
    /// Returns false when another writer moved it first.
    async fn transition(
        &self,
        subscription_id: Uuid,
        from: SubscriptionStatus,
        changes: SubscriptionTransitionEntity,
    ) -> Result<bool>;

    /// Rows in `statuses` whose current period ended at or before `now`.
    async fn list_period_ended(
        &self,
        statuses: Vec<SubscriptionStatus>,
        now: DateTime<Utc>,
    ) -> Result<Vec<GymSubscriptionEntity>>;

    async fn list_grace_elapsed(&self, now: DateTime<Utc>) -> Result<Vec<GymSubscriptionEntity>>;

    /// Active rows not cancelling whose period ends in `(from, to]`.
    async fn list_ending_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<GymSubscriptionEntity>>;
}
