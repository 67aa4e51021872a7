use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use gymdesk_core::{
    domain::{
        repositories::{
            notifications::NotificationRepository, support_tickets::SupportTicketRepository,
        },
        value_objects::{
            enums::roles::Role,
            support_tickets::{
                CreateTicketModel, ListTicketsQuery, ReplyTicketModel, UpdateTicketStatusModel,
            },
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            notifications::NotificationPostgres, support_tickets::SupportTicketPostgres,
        },
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppResult,
    usecases::support_tickets::{SupportTicketUseCase, TicketActor},
};

const ROLES: &[Role] = &[Role::Owner, Role::Staff];

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let ticket_repository = SupportTicketPostgres::new(Arc::clone(&db_pool));
    let notification_repository = NotificationPostgres::new(Arc::clone(&db_pool));
    let ticket_usecase =
        SupportTicketUseCase::new(Arc::new(ticket_repository), Arc::new(notification_repository));

    router(Arc::new(ticket_usecase))
}

pub fn router<T, N>(ticket_usecase: Arc<SupportTicketUseCase<T, N>>) -> Router
where
    T: SupportTicketRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_tickets::<T, N>).post(create_ticket::<T, N>))
        .route("/:id", get(get_ticket::<T, N>))
        .route("/:id/replies", post(reply::<T, N>))
        .route("/:id/status", patch(update_status::<T, N>))
        .with_state(ticket_usecase)
}

fn actor(auth: &AuthUser) -> TicketActor {
    TicketActor {
        user_id: auth.user_id,
        role: auth.role,
        gym_id: auth.gym_id,
    }
}

pub async fn create_ticket<T, N>(
    State(ticket_usecase): State<Arc<SupportTicketUseCase<T, N>>>,
    auth: AuthUser,
    Json(model): Json<CreateTicketModel>,
) -> AppResult<impl IntoResponse>
where
    T: SupportTicketRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let ticket = ticket_usecase.create_ticket(actor(&auth), model).await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn list_tickets<T, N>(
    State(ticket_usecase): State<Arc<SupportTicketUseCase<T, N>>>,
    auth: AuthUser,
    Query(query): Query<ListTicketsQuery>,
) -> AppResult<impl IntoResponse>
where
    T: SupportTicketRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;

    Ok(Json(ticket_usecase.list_tickets(actor(&auth), query).await?))
}

pub async fn get_ticket<T, N>(
    State(ticket_usecase): State<Arc<SupportTicketUseCase<T, N>>>,
    auth: AuthUser,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<impl IntoResponse>
where
    T: SupportTicketRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;

    Ok(Json(ticket_usecase.get_ticket(actor(&auth), ticket_id).await?))
}

pub async fn reply<T, N>(
    State(ticket_usecase): State<Arc<SupportTicketUseCase<T, N>>>,
    auth: AuthUser,
    Path(ticket_id): Path<Uuid>,
    Json(model): Json<ReplyTicketModel>,
) -> AppResult<impl IntoResponse>
where
    T: SupportTicketRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let message = ticket_usecase.reply(actor(&auth), ticket_id, model).await?;

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn update_status<T, N>(
    State(ticket_usecase): State<Arc<SupportTicketUseCase<T, N>>>,
    auth: AuthUser,
    Path(ticket_id): Path<Uuid>,
    Json(model): Json<UpdateTicketStatusModel>,
) -> AppResult<impl IntoResponse>
where
    T: SupportTicketRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;

    Ok(Json(
        ticket_usecase
            .update_status(actor(&auth), ticket_id, model.status)
            .await?,
    ))
}
