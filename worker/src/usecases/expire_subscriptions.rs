use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use gymdesk_core::domain::{
    entities::{
        gym_subscriptions::{GymSubscriptionEntity, SubscriptionTransitionEntity},
        notifications::InsertNotificationEntity,
    },
    repositories::{
        gym_subscriptions::GymSubscriptionRepository, notifications::NotificationRepository,
    },
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus, notifications,
        subscriptions::ExpirySweepReport,
    },
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// How far ahead of the period end the expiring notice goes out.
pub const EXPIRING_NOTICE_DAYS: i64 = 3;

pub struct ExpireSubscriptionsUseCase<S, N>
where
    S: GymSubscriptionRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    notification_repo: Arc<N>,
    grace_days: i64,
}

impl<S, N> ExpireSubscriptionsUseCase<S, N>
where
    S: GymSubscriptionRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>, notification_repo: Arc<N>, grace_days: i64) -> Self {
        Self {
            subscription_repo,
            notification_repo,
            grace_days: grace_days.max(0),
        }
    }

    pub async fn run(&self) -> Result<ExpirySweepReport> {
        self.run_at(Utc::now()).await
    }

    /// One pass over every subscription whose state depends on the clock.
    /// A failing row is logged and skipped, the rest of the pass continues.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<ExpirySweepReport> {
        let mut report = ExpirySweepReport::default();

        let ended = self
            .subscription_repo
            .list_period_ended(
                vec![SubscriptionStatus::Active, SubscriptionStatus::Trialing],
                now,
            )
            .await?;
        for subscription in ended {
            if let Err(err) = self.close_period(&subscription, now, &mut report).await {
                error!(
                    subscription_id = %subscription.id,
                    gym_id = %subscription.gym_id,
                    error = ?err,
                    "expire_subscriptions: failed to close period"
                );
            }
        }

        let lapsed = self.subscription_repo.list_grace_elapsed(now).await?;
        for subscription in lapsed {
            match self.expire(&subscription, SubscriptionStatus::PastDue, now).await {
                Ok(true) => report.expired += 1,
                Ok(false) => {}
                Err(err) => error!(
                    subscription_id = %subscription.id,
                    error = ?err,
                    "expire_subscriptions: failed to expire after grace"
                ),
            }
        }

        let ending = self
            .subscription_repo
            .list_ending_between(now, now + Duration::days(EXPIRING_NOTICE_DAYS))
            .await?;
        for subscription in ending {
            match self.send_expiring_notice(&subscription).await {
                Ok(true) => report.expiring_notices += 1,
                Ok(false) => {}
                Err(err) => error!(
                    subscription_id = %subscription.id,
                    error = ?err,
                    "expire_subscriptions: failed to send expiring notice"
                ),
            }
        }

        info!(
            canceled = report.canceled,
            moved_to_grace = report.moved_to_grace,
            expired = report.expired,
            expiring_notices = report.expiring_notices,
            "expire_subscriptions: completed"
        );

        Ok(report)
    }

    async fn close_period(
        &self,
        subscription: &GymSubscriptionEntity,
        now: DateTime<Utc>,
        report: &mut ExpirySweepReport,
    ) -> Result<()> {
        let from = SubscriptionStatus::from_str(&subscription.status);

        if subscription.cancel_at_period_end {
            let changes = SubscriptionTransitionEntity {
                scheduled_plan_id: Some(None),
                ..SubscriptionTransitionEntity::to_status(SubscriptionStatus::Canceled.as_str(), now)
            };
            if self
                .subscription_repo
                .transition(subscription.id, from, changes)
                .await?
            {
                info!(gym_id = %subscription.gym_id, "expire_subscriptions: canceled at period end");
                report.canceled += 1;
            }
            return Ok(());
        }

        if from == SubscriptionStatus::Trialing {
            if self.expire(subscription, from, now).await? {
                report.expired += 1;
            }
            return Ok(());
        }

        let grace_ends_at = subscription.current_period_end + Duration::days(self.grace_days);
        let mut changes = SubscriptionTransitionEntity {
            grace_ends_at: Some(Some(grace_ends_at)),
            ..SubscriptionTransitionEntity::to_status(SubscriptionStatus::PastDue.as_str(), now)
        };
        if let Some(scheduled_plan_id) = subscription.scheduled_plan_id {
            changes.plan_id = Some(scheduled_plan_id);
            changes.scheduled_plan_id = Some(None);
        }

        if !self
            .subscription_repo
            .transition(subscription.id, from, changes)
            .await?
        {
            return Ok(());
        }

        info!(
            gym_id = %subscription.gym_id,
            %grace_ends_at,
            downgraded = subscription.scheduled_plan_id.is_some(),
            "expire_subscriptions: moved to grace"
        );
        report.moved_to_grace += 1;
        self.notify(notifications::subscription_past_due(
            subscription.gym_id,
            grace_ends_at,
        ))
        .await;

        Ok(())
    }

    async fn expire(
        &self,
        subscription: &GymSubscriptionEntity,
        from: SubscriptionStatus,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let changes = SubscriptionTransitionEntity::to_status(SubscriptionStatus::Expired.as_str(), now);
        if !self
            .subscription_repo
            .transition(subscription.id, from, changes)
            .await?
        {
            return Ok(false);
        }

        info!(gym_id = %subscription.gym_id, %from, "expire_subscriptions: expired");
        self.notify(notifications::subscription_expired(subscription.gym_id))
            .await;
        Ok(true)
    }

    async fn send_expiring_notice(&self, subscription: &GymSubscriptionEntity) -> Result<bool> {
        let notice =
            notifications::subscription_expiring(subscription.gym_id, subscription.current_period_end);
        let reference = notice.reference.clone().unwrap_or_default();

        if self
            .notification_repo
            .exists(subscription.gym_id, &notice.kind, &reference)
            .await?
        {
            return Ok(false);
        }

        self.notification_repo.create_notification(notice).await?;
        Ok(true)
    }

    /// The transition already happened, a lost notification must not undo it.
    async fn notify(&self, notification: InsertNotificationEntity) {
        let gym_id = notification.gym_id;
        let kind = notification.kind.clone();
        if let Err(err) = self.notification_repo.create_notification(notification).await {
            warn!(%gym_id, %kind, error = ?err, "expire_subscriptions: notification failed");
        }
    }
}
