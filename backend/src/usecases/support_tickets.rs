use gymdesk_core::domain::{
    entities::support_tickets::{
        InsertSupportTicketEntity, InsertTicketMessageEntity, SupportTicketEntity,
        TicketMessageEntity,
    },
    repositories::{notifications::NotificationRepository, support_tickets::SupportTicketRepository},
    value_objects::{
        enums::{roles::Role, ticket_statuses::TicketStatus},
        notifications,
        support_tickets::{CreateTicketModel, ListTicketsQuery, ReplyTicketModel, TicketDetailDto},
    },
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::axum_http::error_responses::{AppError, AppResult};

/// Who is acting on a ticket. Platform admins carry no gym.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketActor {
    pub user_id: Uuid,
    pub role: Role,
    pub gym_id: Option<Uuid>,
}

impl TicketActor {
    fn is_admin(&self) -> bool {
        self.role == Role::PlatformAdmin
    }

    fn scope(&self) -> Option<Uuid> {
        if self.is_admin() { None } else { self.gym_id }
    }
}

pub struct SupportTicketUseCase<T, N>
where
    T: SupportTicketRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    ticket_repo: Arc<T>,
    notification_repo: Arc<N>,
}

impl<T, N> SupportTicketUseCase<T, N>
where
    T: SupportTicketRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    pub fn new(ticket_repo: Arc<T>, notification_repo: Arc<N>) -> Self {
        Self {
            ticket_repo,
            notification_repo,
        }
    }

    pub async fn create_ticket(
        &self,
        actor: TicketActor,
        model: CreateTicketModel,
    ) -> AppResult<TicketDetailDto> {
        let gym_id = actor
            .gym_id
            .ok_or_else(|| AppError::Forbidden("tickets are opened by a gym".to_string()))?;

        let subject = model.subject.trim().to_string();
        let body = model.body.trim().to_string();
        if subject.is_empty() || body.is_empty() {
            return Err(AppError::BadRequest(
                "subject and body are required".to_string(),
            ));
        }

        let ticket = self
            .ticket_repo
            .open_ticket(
                InsertSupportTicketEntity {
                    gym_id,
                    opened_by: actor.user_id,
                    subject,
                    priority: model.priority.to_string(),
                    status: TicketStatus::Open.to_string(),
                },
                InsertTicketMessageEntity {
                    ticket_id: Uuid::nil(),
                    author_id: actor.user_id,
                    author_role: actor.role.to_string(),
                    body,
                },
            )
            .await?;

        info!(%gym_id, ticket_id = %ticket.id, priority = %ticket.priority, "support_tickets: ticket opened");

        let messages = self.ticket_repo.list_messages(ticket.id).await?;
        Ok(TicketDetailDto { ticket, messages })
    }

    pub async fn list_tickets(
        &self,
        actor: TicketActor,
        query: ListTicketsQuery,
    ) -> AppResult<Vec<SupportTicketEntity>> {
        Ok(self
            .ticket_repo
            .list_tickets(actor.scope(), query.status)
            .await?)
    }

    pub async fn get_ticket(&self, actor: TicketActor, ticket_id: Uuid) -> AppResult<TicketDetailDto> {
        let ticket = self.find_ticket(actor, ticket_id).await?;
        let messages = self.ticket_repo.list_messages(ticket.id).await?;
        Ok(TicketDetailDto { ticket, messages })
    }

    pub async fn reply(
        &self,
        actor: TicketActor,
        ticket_id: Uuid,
        model: ReplyTicketModel,
    ) -> AppResult<TicketMessageEntity> {
        let body = model.body.trim().to_string();
        if body.is_empty() {
            return Err(AppError::BadRequest("body is required".to_string()));
        }

        let ticket = self.find_ticket(actor, ticket_id).await?;
        let status = ticket_status(&ticket)?;
        if status == TicketStatus::Closed {
            return Err(AppError::Conflict("ticket is closed".to_string()));
        }

        let message = self
            .ticket_repo
            .add_message(InsertTicketMessageEntity {
                ticket_id: ticket.id,
                author_id: actor.user_id,
                author_role: actor.role.to_string(),
                body,
            })
            .await?;

        let next = match (actor.is_admin(), status) {
            (true, TicketStatus::Open) => Some(TicketStatus::InProgress),
            (false, TicketStatus::Resolved) => Some(TicketStatus::Open),
            _ => None,
        };

        if let Some(next) = next {
            if let Some(updated) = self.ticket_repo.update_status(ticket.id, next).await? {
                self.notify(&updated).await?;
            }
        } else if actor.is_admin() {
            self.notify(&ticket).await?;
        }

        Ok(message)
    }

    pub async fn update_status(
        &self,
        actor: TicketActor,
        ticket_id: Uuid,
        next: TicketStatus,
    ) -> AppResult<SupportTicketEntity> {
        let ticket = self.find_ticket(actor, ticket_id).await?;
        let current = ticket_status(&ticket)?;

        if !current.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "ticket cannot move from {current} to {next}"
            )));
        }

        let updated = self
            .ticket_repo
            .update_status(ticket.id, next)
            .await?
            .ok_or(AppError::NotFound("ticket"))?;

        info!(ticket_id = %updated.id, from = %current, to = %next, "support_tickets: status changed");
        self.notify(&updated).await?;
        Ok(updated)
    }

    async fn find_ticket(&self, actor: TicketActor, ticket_id: Uuid) -> AppResult<SupportTicketEntity> {
        self.ticket_repo
            .find_ticket(actor.scope(), ticket_id)
            .await?
            .ok_or(AppError::NotFound("ticket"))
    }

    async fn notify(&self, ticket: &SupportTicketEntity) -> AppResult<()> {
        self.notification_repo
            .create_notification(notifications::ticket_updated(
                ticket.gym_id,
                &ticket.subject,
                &ticket.status,
                ticket.id,
            ))
            .await?;
        Ok(())
    }
}

fn ticket_status(ticket: &SupportTicketEntity) -> AppResult<TicketStatus> {
    TicketStatus::from_str(&ticket.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "ticket {} has unknown status {}",
            ticket.id,
            ticket.status
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gymdesk_core::domain::{
        repositories::{
            notifications::MockNotificationRepository,
            support_tickets::MockSupportTicketRepository,
        },
        value_objects::enums::ticket_priorities::TicketPriority,
    };
    use mockall::predicate::eq;

    fn ticket(gym_id: Uuid, status: TicketStatus) -> SupportTicketEntity {
        let now = Utc::now();
        SupportTicketEntity {
            id: Uuid::new_v4(),
            gym_id,
            opened_by: Uuid::new_v4(),
            subject: "Card reader broken".to_string(),
            priority: "normal".to_string(),
            status: status.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn message(insert: InsertTicketMessageEntity) -> TicketMessageEntity {
        TicketMessageEntity {
            id: Uuid::new_v4(),
            ticket_id: insert.ticket_id,
            author_id: insert.author_id,
            author_role: insert.author_role,
            body: insert.body,
            created_at: Utc::now(),
        }
    }

    fn owner(gym_id: Uuid) -> TicketActor {
        TicketActor {
            user_id: Uuid::new_v4(),
            role: Role::Owner,
            gym_id: Some(gym_id),
        }
    }

    fn admin() -> TicketActor {
        TicketActor {
            user_id: Uuid::new_v4(),
            role: Role::PlatformAdmin,
            gym_id: None,
        }
    }

    #[tokio::test]
    async fn admin_reply_moves_open_ticket_in_progress() {
        let gym_id = Uuid::new_v4();
        let existing = ticket(gym_id, TicketStatus::Open);
        let ticket_id = existing.id;

        let mut tickets = MockSupportTicketRepository::new();
        let found = existing.clone();
        tickets
            .expect_find_ticket()
            .with(eq(None::<Uuid>), eq(ticket_id))
            .returning(move |_, _| Ok(Some(found.clone())));
        tickets.expect_add_message().returning(|insert| Ok(message(insert)));
        let moved = existing.clone();
        tickets
            .expect_update_status()
            .with(eq(ticket_id), eq(TicketStatus::InProgress))
            .times(1)
            .returning(move |_, status| {
                let mut ticket = moved.clone();
                ticket.status = status.to_string();
                Ok(Some(ticket))
            });

        let mut notifications = MockNotificationRepository::new();
        notifications
            .expect_create_notification()
            .withf(move |n| n.gym_id == gym_id && n.kind == "ticket_updated")
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));

        let usecase = SupportTicketUseCase::new(Arc::new(tickets), Arc::new(notifications));
        let reply = usecase
            .reply(
                admin(),
                ticket_id,
                ReplyTicketModel {
                    body: "Looking into it".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(reply.author_role, "platform_admin");
    }

    #[tokio::test]
    async fn tenant_reply_reopens_resolved_ticket() {
        let gym_id = Uuid::new_v4();
        let existing = ticket(gym_id, TicketStatus::Resolved);
        let ticket_id = existing.id;

        let mut tickets = MockSupportTicketRepository::new();
        let found = existing.clone();
        tickets
            .expect_find_ticket()
            .with(eq(Some(gym_id)), eq(ticket_id))
            .returning(move |_, _| Ok(Some(found.clone())));
        tickets.expect_add_message().returning(|insert| Ok(message(insert)));
        let moved = existing.clone();
        tickets
            .expect_update_status()
            .with(eq(ticket_id), eq(TicketStatus::Open))
            .times(1)
            .returning(move |_, status| {
                let mut ticket = moved.clone();
                ticket.status = status.to_string();
                Ok(Some(ticket))
            });

        let mut notifications = MockNotificationRepository::new();
        notifications
            .expect_create_notification()
            .returning(|_| Ok(Uuid::new_v4()));

        let usecase = SupportTicketUseCase::new(Arc::new(tickets), Arc::new(notifications));
        usecase
            .reply(
                owner(gym_id),
                ticket_id,
                ReplyTicketModel {
                    body: "Still broken".to_string(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn closed_ticket_cannot_transition() {
        let gym_id = Uuid::new_v4();
        let existing = ticket(gym_id, TicketStatus::Closed);
        let ticket_id = existing.id;

        let mut tickets = MockSupportTicketRepository::new();
        tickets
            .expect_find_ticket()
            .returning(move |_, _| Ok(Some(existing.clone())));
        tickets.expect_update_status().never();

        let usecase = SupportTicketUseCase::new(
            Arc::new(tickets),
            Arc::new(MockNotificationRepository::new()),
        );

        let result = usecase
            .update_status(admin(), ticket_id, TicketStatus::Open)
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn ticket_of_another_gym_is_not_found() {
        let mut tickets = MockSupportTicketRepository::new();
        tickets.expect_find_ticket().returning(|_, _| Ok(None));

        let usecase = SupportTicketUseCase::new(
            Arc::new(tickets),
            Arc::new(MockNotificationRepository::new()),
        );

        let result = usecase.get_ticket(owner(Uuid::new_v4()), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound("ticket"))));
    }

    #[tokio::test]
    async fn admin_cannot_open_a_ticket() {
        let usecase = SupportTicketUseCase::new(
            Arc::new(MockSupportTicketRepository::new()),
            Arc::new(MockNotificationRepository::new()),
        );

        let result = usecase
            .create_ticket(
                admin(),
                CreateTicketModel {
                    subject: "Hello".to_string(),
                    body: "World".to_string(),
                    priority: TicketPriority::Low,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
