use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use gymdesk_core::{
    domain::{
        repositories::notifications::NotificationRepository,
        value_objects::{enums::roles::Role, notifications::ListNotificationsQuery},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::notifications::NotificationPostgres,
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppResult,
    usecases::notifications::NotificationUseCase,
};

const ROLES: &[Role] = &[Role::Owner, Role::Staff];

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let notification_repository = NotificationPostgres::new(db_pool);
    let notification_usecase = NotificationUseCase::new(Arc::new(notification_repository));

    router(Arc::new(notification_usecase))
}

pub fn router<T>(notification_usecase: Arc<NotificationUseCase<T>>) -> Router
where
    T: NotificationRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_notifications::<T>))
        .route("/read-all", post(mark_all_read::<T>))
        .route("/:id/read", post(mark_read::<T>))
        .with_state(notification_usecase)
}

pub async fn list_notifications<T>(
    State(notification_usecase): State<Arc<NotificationUseCase<T>>>,
    auth: AuthUser,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<impl IntoResponse>
where
    T: NotificationRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;

    Ok(Json(notification_usecase.list(gym_id, query).await?))
}

pub async fn mark_read<T>(
    State(notification_usecase): State<Arc<NotificationUseCase<T>>>,
    auth: AuthUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<impl IntoResponse>
where
    T: NotificationRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;
    notification_usecase.mark_read(gym_id, notification_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_read<T>(
    State(notification_usecase): State<Arc<NotificationUseCase<T>>>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse>
where
    T: NotificationRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;

    Ok(Json(notification_usecase.mark_all_read(gym_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{bearer, with_auth};
    use axum::{
        body::Body,
        http::{Request, header::AUTHORIZATION},
    };
    use gymdesk_core::domain::repositories::notifications::MockNotificationRepository;
    use tower::ServiceExt;

    fn app(repo: MockNotificationRepository) -> Router {
        with_auth(router(Arc::new(NotificationUseCase::new(Arc::new(repo)))))
    }

    #[tokio::test]
    async fn marking_another_gyms_notification_is_not_found() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_mark_read().returning(|_, _| Ok(false));

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/{}/read", Uuid::new_v4()))
                    .header(AUTHORIZATION, bearer("owner", Some(Uuid::new_v4())))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn platform_admin_without_gym_is_forbidden() {
        let response = app(MockNotificationRepository::new())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/read-all")
                    .header(AUTHORIZATION, bearer("platform_admin", None))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
