use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::support_tickets::{
        InsertSupportTicketEntity, InsertTicketMessageEntity, SupportTicketEntity,
        TicketMessageEntity,
    },
    value_objects::enums::ticket_statuses::TicketStatus,
};

#[automock]
#[async_trait]
pub trait SupportTicketRepository {
    /// Inserts the ticket and its first message in one transaction.
    async fn open_ticket(
        &self,
        ticket: InsertSupportTicketEntity,
        first_message: InsertTicketMessageEntity,
    ) -> Result<SupportTicketEntity>;

    /// `gym_scope = None` looks across all gyms.
    async fn find_ticket(
        &self,
        gym_scope: Option<Uuid>,
        ticket_id: Uuid,
    ) -> Result<Option<SupportTicketEntity>>;

    async fn list_tickets(
        &self,
        gym_scope: Option<Uuid>,
        status: Option<TicketStatus>,
    ) -> Result<Vec<SupportTicketEntity>>;

    async fn add_message(&self, message: InsertTicketMessageEntity) -> Result<TicketMessageEntity>;

    async fn list_messages(&self, ticket_id: Uuid) -> Result<Vec<TicketMessageEntity>>;

    async fn update_status(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
    ) -> Result<Option<SupportTicketEntity>>;
}
