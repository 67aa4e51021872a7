use anyhow::Result;
use chrono::{DateTime, Utc};
use gymdesk_core::domain::{
    entities::{gym_subscriptions::GymSubscriptionEntity, saas_plans::SaasPlanEntity},
    repositories::{gym_subscriptions::GymSubscriptionRepository, saas_plans::SaasPlanRepository},
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// What a gym may do right now under its platform subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct GymAccess {
    pub subscription: Option<GymSubscriptionEntity>,
    pub plan: Option<SaasPlanEntity>,
    pub status: SubscriptionStatus,
    pub access_granted: bool,
}

impl GymAccess {
    /// `None` means the plan allows any number of members.
    pub fn max_members(&self) -> Option<i32> {
        self.plan.as_ref().and_then(|plan| plan.max_members)
    }
}

/// Resolves a gym's effective subscription status and plan.
pub struct AccessResolver<S, P>
where
    S: GymSubscriptionRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    plan_repo: Arc<P>,
}

impl<S, P> AccessResolver<S, P>
where
    S: GymSubscriptionRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>, plan_repo: Arc<P>) -> Self {
        Self {
            subscription_repo,
            plan_repo,
        }
    }

    pub async fn resolve(&self, gym_id: Uuid, now: DateTime<Utc>) -> Result<GymAccess> {
        let Some(subscription) = self.subscription_repo.find_by_gym(gym_id).await? else {
            debug!(%gym_id, "access_resolver: gym has no subscription");
            return Ok(GymAccess {
                subscription: None,
                plan: None,
                status: SubscriptionStatus::Expired,
                access_granted: false,
            });
        };

        let status = effective_status(&subscription, now);
        let plan = self.plan_repo.find_by_id(subscription.plan_id).await?;

        debug!(
            %gym_id,
            plan_id = %subscription.plan_id,
            stored_status = %subscription.status,
            effective_status = %status,
            "access_resolver: subscription resolved"
        );

        Ok(GymAccess {
            access_granted: status.grants_access(),
            status,
            plan,
            subscription: Some(subscription),
        })
    }
}

/// Applies expiry the sweep has not written yet, so access never outlives the
/// paid period plus grace.
pub fn effective_status(subscription: &GymSubscriptionEntity, now: DateTime<Utc>) -> SubscriptionStatus {
    let stored = SubscriptionStatus::from_str(&subscription.status);

    match stored {
        SubscriptionStatus::Trialing if subscription.current_period_end <= now => {
            SubscriptionStatus::Expired
        }
        SubscriptionStatus::PastDue => match subscription.grace_ends_at {
            Some(grace_ends_at) if grace_ends_at > now => SubscriptionStatus::PastDue,
            _ => SubscriptionStatus::Expired,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gymdesk_core::domain::{
        repositories::{
            gym_subscriptions::MockGymSubscriptionRepository,
            saas_plans::MockSaasPlanRepository,
        },
        value_objects::saas_plans::SaasPlanFeatures,
    };
    use mockall::predicate::eq;

    fn subscription(gym_id: Uuid, plan_id: Uuid, status: &str) -> GymSubscriptionEntity {
        let now = Utc::now();
        GymSubscriptionEntity {
            id: Uuid::new_v4(),
            gym_id,
            plan_id,
            status: status.to_string(),
            current_period_start: now - Duration::days(10),
            current_period_end: now + Duration::days(20),
            grace_ends_at: None,
            cancel_at_period_end: false,
            scheduled_plan_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn plan(id: Uuid, max_members: Option<i32>) -> SaasPlanEntity {
        SaasPlanEntity {
            id,
            name: "Starter".to_string(),
            tier: 1,
            price_minor: 99_900,
            interval_days: 30,
            max_members,
            features: SaasPlanFeatures::default(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn active_subscription_grants_access_with_plan_limit() {
        let gym_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();

        let mut subscription_repo = MockGymSubscriptionRepository::new();
        let mut plan_repo = MockSaasPlanRepository::new();

        let sub = subscription(gym_id, plan_id, "active");
        subscription_repo
            .expect_find_by_gym()
            .with(eq(gym_id))
            .returning(move |_| Ok(Some(sub.clone())));
        plan_repo
            .expect_find_by_id()
            .with(eq(plan_id))
            .returning(move |id| Ok(Some(plan(id, Some(150)))));

        let resolver = AccessResolver::new(Arc::new(subscription_repo), Arc::new(plan_repo));
        let access = resolver.resolve(gym_id, Utc::now()).await.unwrap();

        assert!(access.access_granted);
        assert_eq!(access.status, SubscriptionStatus::Active);
        assert_eq!(access.max_members(), Some(150));
    }

    #[tokio::test]
    async fn gym_without_subscription_has_no_access() {
        let mut subscription_repo = MockGymSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_gym()
            .returning(|_| Ok(None));

        let resolver = AccessResolver::new(
            Arc::new(subscription_repo),
            Arc::new(MockSaasPlanRepository::new()),
        );
        let access = resolver.resolve(Uuid::new_v4(), Utc::now()).await.unwrap();

        assert!(!access.access_granted);
        assert_eq!(access.max_members(), None);
    }

    #[test]
    fn past_due_after_grace_reads_as_expired() {
        let now = Utc::now();
        let mut sub = subscription(Uuid::new_v4(), Uuid::new_v4(), "past_due");

        sub.grace_ends_at = Some(now + Duration::days(2));
        assert_eq!(effective_status(&sub, now), SubscriptionStatus::PastDue);

        sub.grace_ends_at = Some(now - Duration::seconds(1));
        assert_eq!(effective_status(&sub, now), SubscriptionStatus::Expired);
    }

    #[test]
    fn ended_trial_reads_as_expired() {
        let now = Utc::now();
        let mut sub = subscription(Uuid::new_v4(), Uuid::new_v4(), "trialing");
        sub.current_period_end = now - Duration::minutes(5);

        assert_eq!(effective_status(&sub, now), SubscriptionStatus::Expired);
    }
}
