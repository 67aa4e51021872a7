use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::faqs;

#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = faqs)]
pub struct FaqEntity {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub position: i32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = faqs)]
pub struct InsertFaqEntity {
    pub question: String,
    pub answer: String,
    pub position: i32,
    pub is_published: bool,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = faqs)]
pub struct UpdateFaqEntity {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub position: Option<i32>,
    pub is_published: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}
