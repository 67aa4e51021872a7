use gymdesk_core::domain::{
    entities::notifications::NotificationEntity,
    repositories::notifications::NotificationRepository,
    value_objects::notifications::{ListNotificationsQuery, MarkAllReadDto},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::axum_http::error_responses::{AppError, AppResult};

pub struct NotificationUseCase<T>
where
    T: NotificationRepository + Send + Sync + 'static,
{
    notification_repo: Arc<T>,
}

impl<T> NotificationUseCase<T>
where
    T: NotificationRepository + Send + Sync + 'static,
{
    pub fn new(notification_repo: Arc<T>) -> Self {
        Self { notification_repo }
    }

    pub async fn list(
        &self,
        gym_id: Uuid,
        query: ListNotificationsQuery,
    ) -> AppResult<Vec<NotificationEntity>> {
        Ok(self
            .notification_repo
            .list_notifications(gym_id, query.unread_only)
            .await?)
    }

    pub async fn mark_read(&self, gym_id: Uuid, notification_id: Uuid) -> AppResult<()> {
        if !self.notification_repo.mark_read(gym_id, notification_id).await? {
            return Err(AppError::NotFound("notification"));
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, gym_id: Uuid) -> AppResult<MarkAllReadDto> {
        let updated = self.notification_repo.mark_all_read(gym_id).await?;
        debug!(%gym_id, updated, "notifications: marked all read");
        Ok(MarkAllReadDto { updated })
    }
}
