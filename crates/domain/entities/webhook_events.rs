use diesel::prelude::*;

use crate::infra::db::postgres::schema::webhook_events;

/// Delivery record of a gateway webhook; `event_id` is unique.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = webhook_events)]
pub struct InsertWebhookEventEntity {
    pub event_id: String,
    pub event_type: String,
}
