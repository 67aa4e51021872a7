use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{support_tickets, ticket_messages},
    },
};
use domain::{
    entities::support_tickets::{
        InsertSupportTicketEntity, InsertTicketMessageEntity, SupportTicketEntity,
        TicketMessageEntity,
    },
    repositories::support_tickets::SupportTicketRepository,
    value_objects::enums::ticket_statuses::TicketStatus,
};

pub struct SupportTicketPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SupportTicketPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SupportTicketRepository for SupportTicketPostgres {
    async fn open_ticket(
        &self,
        ticket: InsertSupportTicketEntity,
        first_message: InsertTicketMessageEntity,
    ) -> Result<SupportTicketEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let created = insert_into(support_tickets::table)
                .values(&ticket)
                .returning(SupportTicketEntity::as_returning())
                .get_result::<SupportTicketEntity>(conn)?;

            let message = InsertTicketMessageEntity {
                ticket_id: created.id,
                ..first_message
            };
            insert_into(ticket_messages::table)
                .values(&message)
                .execute(conn)?;

            Ok(created)
        })?;

        Ok(created)
    }

    async fn find_ticket(
        &self,
        gym_scope: Option<Uuid>,
        ticket_id: Uuid,
    ) -> Result<Option<SupportTicketEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = support_tickets::table
            .filter(support_tickets::id.eq(ticket_id))
            .into_boxed();

        if let Some(gym_id) = gym_scope {
            query = query.filter(support_tickets::gym_id.eq(gym_id));
        }

        let result = query
            .select(SupportTicketEntity::as_select())
            .first::<SupportTicketEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_tickets(
        &self,
        gym_scope: Option<Uuid>,
        status: Option<TicketStatus>,
    ) -> Result<Vec<SupportTicketEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = support_tickets::table.into_boxed();

        if let Some(gym_id) = gym_scope {
            query = query.filter(support_tickets::gym_id.eq(gym_id));
        }
        if let Some(status) = status {
            query = query.filter(support_tickets::status.eq(status.as_str()));
        }

        let results = query
            .order(support_tickets::updated_at.desc())
            .select(SupportTicketEntity::as_select())
            .load::<SupportTicketEntity>(&mut conn)?;

        Ok(results)
    }

    async fn add_message(&self, message: InsertTicketMessageEntity) -> Result<TicketMessageEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let created = insert_into(ticket_messages::table)
                .values(&message)
                .returning(TicketMessageEntity::as_returning())
                .get_result::<TicketMessageEntity>(conn)?;

            update(support_tickets::table)
                .filter(support_tickets::id.eq(message.ticket_id))
                .set(support_tickets::updated_at.eq(created.created_at))
                .execute(conn)?;

            Ok(created)
        })?;

        Ok(created)
    }

    async fn list_messages(&self, ticket_id: Uuid) -> Result<Vec<TicketMessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = ticket_messages::table
            .filter(ticket_messages::ticket_id.eq(ticket_id))
            .order(ticket_messages::created_at.asc())
            .select(TicketMessageEntity::as_select())
            .load::<TicketMessageEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update_status(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
    ) -> Result<Option<SupportTicketEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(support_tickets::table)
            .filter(support_tickets::id.eq(ticket_id))
            .set((
                support_tickets::status.eq(status.as_str()),
                support_tickets::updated_at.eq(Utc::now()),
            ))
            .returning(SupportTicketEntity::as_returning())
            .get_result::<SupportTicketEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
