use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{support_tickets, ticket_messages};

#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = support_tickets)]
pub struct SupportTicketEntity {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub opened_by: Uuid,
    pub subject: String,
    pub priority: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = support_tickets)]
pub struct InsertSupportTicketEntity {
    pub gym_id: Uuid,
    pub opened_by: Uuid,
    pub subject: String,
    pub priority: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = ticket_messages)]
pub struct TicketMessageEntity {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    pub author_role: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// `ticket_id` is filled in by the repository when the message opens a new ticket.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ticket_messages)]
pub struct InsertTicketMessageEntity {
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    pub author_role: String,
    pub body: String,
}
