use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::notifications;

#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = notifications)]
pub struct NotificationEntity {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub reference: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = notifications)]
pub struct InsertNotificationEntity {
    pub gym_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub reference: Option<String>,
}
