use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::support_tickets::{SupportTicketEntity, TicketMessageEntity},
    value_objects::enums::{ticket_priorities::TicketPriority, ticket_statuses::TicketStatus},
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketModel {
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub priority: TicketPriority,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyTicketModel {
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTicketStatusModel {
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTicketsQuery {
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TicketDetailDto {
    pub ticket: SupportTicketEntity,
    pub messages: Vec<TicketMessageEntity>,
}
