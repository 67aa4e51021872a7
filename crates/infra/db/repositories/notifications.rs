use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, dsl::exists, insert_into, prelude::*, select, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::notifications},
};
use domain::{
    entities::notifications::{InsertNotificationEntity, NotificationEntity},
    repositories::notifications::NotificationRepository,
};

pub struct NotificationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl NotificationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl NotificationRepository for NotificationPostgres {
    async fn create_notification(&self, notification: InsertNotificationEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let id = insert_into(notifications::table)
            .values(&notification)
            .returning(notifications::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(id)
    }

    async fn exists(&self, gym_id: Uuid, kind: &str, reference: &str) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let found = select(exists(
            notifications::table
                .filter(notifications::gym_id.eq(gym_id))
                .filter(notifications::kind.eq(kind))
                .filter(notifications::reference.eq(reference)),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(found)
    }

    async fn list_notifications(
        &self,
        gym_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<NotificationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = notifications::table
            .filter(notifications::gym_id.eq(gym_id))
            .into_boxed();

        if unread_only {
            query = query.filter(notifications::read_at.is_null());
        }

        let results = query
            .order(notifications::created_at.desc())
            .select(NotificationEntity::as_select())
            .load::<NotificationEntity>(&mut conn)?;

        Ok(results)
    }

    async fn mark_read(&self, gym_id: Uuid, notification_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Already-read rows still count as found; only the first read time is kept.
        let found = select(exists(
            notifications::table
                .filter(notifications::id.eq(notification_id))
                .filter(notifications::gym_id.eq(gym_id)),
        ))
        .get_result::<bool>(&mut conn)?;

        if found {
            update(notifications::table)
                .filter(notifications::id.eq(notification_id))
                .filter(notifications::read_at.is_null())
                .set(notifications::read_at.eq(Some(Utc::now())))
                .execute(&mut conn)?;
        }

        Ok(found)
    }

    async fn mark_all_read(&self, gym_id: Uuid) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(notifications::table)
            .filter(notifications::gym_id.eq(gym_id))
            .filter(notifications::read_at.is_null())
            .set(notifications::read_at.eq(Some(Utc::now())))
            .execute(&mut conn)?;

        Ok(updated)
    }
}
