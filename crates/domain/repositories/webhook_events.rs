use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

#[automock]
#[async_trait]
pub trait WebhookEventRepository {
    /// Returns false when the event id was already recorded.
    async fn record_if_new(&self, event_id: &str, event_type: &str) -> Result<bool>;

    /// Drops a recorded event id so a redelivery of that event is processed.
    async fn forget(&self, event_id: &str) -> Result<()>;
}
