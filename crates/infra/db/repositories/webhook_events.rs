use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::webhook_events},
};
use domain::{
    entities::webhook_events::InsertWebhookEventEntity,
    repositories::webhook_events::WebhookEventRepository,
};

pub struct WebhookEventPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl WebhookEventPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl WebhookEventRepository for WebhookEventPostgres {
    async fn record_if_new(&self, event_id: &str, event_type: &str) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let inserted = insert_into(webhook_events::table)
            .values(&InsertWebhookEventEntity {
                event_id: event_id.to_string(),
                event_type: event_type.to_string(),
            })
            .on_conflict(webhook_events::event_id)
            .do_nothing()
            .execute(&mut conn)?;

        Ok(inserted == 1)
    }

    async fn forget(&self, event_id: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(webhook_events::table)
            .filter(webhook_events::event_id.eq(event_id))
            .execute(&mut conn)?;

        Ok(())
    }
}
