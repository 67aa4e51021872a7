use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::notifications::{InsertNotificationEntity, NotificationEntity};

#[automock]
#[async_trait]
pub trait NotificationRepository {
    async fn create_notification(&self, notification: InsertNotificationEntity) -> Result<Uuid>;

    async fn exists(&self, gym_id: Uuid, kind: &str, reference: &str) -> Result<bool>;

    async fn list_notifications(
        &self,
        gym_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<NotificationEntity>>;

    async fn mark_read(&self, gym_id: Uuid, notification_id: Uuid) -> Result<bool>;

    async fn mark_all_read(&self, gym_id: Uuid) -> Result<usize>;
}
