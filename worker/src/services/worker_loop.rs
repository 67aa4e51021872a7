use crate::usecases::expire_subscriptions::ExpireSubscriptionsUseCase;
use anyhow::Result;
use gymdesk_core::domain::repositories::{
    gym_subscriptions::GymSubscriptionRepository, notifications::NotificationRepository,
};
use std::{sync::Arc, time::Duration};
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Runs the expiry sweep forever. The first pass starts immediately.
pub async fn run<S, N>(usecase: Arc<ExpireSubscriptionsUseCase<S, N>>, interval_secs: u64) -> Result<()>
where
    S: GymSubscriptionRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    info!(interval_secs, "worker_loop: expiry sweep scheduled");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        if let Err(err) = usecase.run().await {
            error!(error = ?err, "worker_loop: expiry sweep failed");
        }
    }
}
