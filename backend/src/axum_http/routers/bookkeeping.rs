use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use gymdesk_core::{
    domain::{
        repositories::bookkeeping::BookkeepingRepository,
        value_objects::{
            bookkeeping::{CreateExpenseModel, DateRangeQuery},
            enums::roles::Role,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::bookkeeping::BookkeepingPostgres,
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppResult,
    usecases::bookkeeping::BookkeepingUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let bookkeeping_repository = BookkeepingPostgres::new(db_pool);
    let bookkeeping_usecase = BookkeepingUseCase::new(Arc::new(bookkeeping_repository));

    router(Arc::new(bookkeeping_usecase))
}

pub fn router<T>(bookkeeping_usecase: Arc<BookkeepingUseCase<T>>) -> Router
where
    T: BookkeepingRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/expenses",
            get(list_expenses::<T>).post(create_expense::<T>),
        )
        .route("/expenses/:id", delete(delete_expense::<T>))
        .route("/summary", get(summary::<T>))
        .with_state(bookkeeping_usecase)
}

pub async fn create_expense<T>(
    State(bookkeeping_usecase): State<Arc<BookkeepingUseCase<T>>>,
    auth: AuthUser,
    Json(model): Json<CreateExpenseModel>,
) -> AppResult<impl IntoResponse>
where
    T: BookkeepingRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner])?;
    let gym_id = auth.require_gym()?;
    let expense = bookkeeping_usecase
        .create_expense(gym_id, auth.user_id, model)
        .await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn list_expenses<T>(
    State(bookkeeping_usecase): State<Arc<BookkeepingUseCase<T>>>,
    auth: AuthUser,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<impl IntoResponse>
where
    T: BookkeepingRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner])?;
    let gym_id = auth.require_gym()?;

    Ok(Json(bookkeeping_usecase.list_expenses(gym_id, range).await?))
}

pub async fn delete_expense<T>(
    State(bookkeeping_usecase): State<Arc<BookkeepingUseCase<T>>>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> AppResult<impl IntoResponse>
where
    T: BookkeepingRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner])?;
    let gym_id = auth.require_gym()?;
    bookkeeping_usecase.delete_expense(gym_id, expense_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn summary<T>(
    State(bookkeeping_usecase): State<Arc<BookkeepingUseCase<T>>>,
    auth: AuthUser,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<impl IntoResponse>
where
    T: BookkeepingRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner])?;
    let gym_id = auth.require_gym()?;

    Ok(Json(bookkeeping_usecase.summary(gym_id, range).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{bearer, with_auth};
    use axum::{
        body::Body,
        http::{Request, header::AUTHORIZATION},
    };
    use gymdesk_core::domain::repositories::bookkeeping::MockBookkeepingRepository;
    use tower::ServiceExt;

    fn app(repo: MockBookkeepingRepository) -> Router {
        with_auth(router(Arc::new(BookkeepingUseCase::new(Arc::new(repo)))))
    }

    #[tokio::test]
    async fn staff_cannot_read_the_books() {
        let response = app(MockBookkeepingRepository::new())
            .oneshot(
                Request::builder()
                    .uri("/summary?from=2026-05-01T00:00:00Z&to=2026-06-01T00:00:00Z")
                    .header(AUTHORIZATION, bearer("staff", Some(Uuid::new_v4())))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reversed_range_is_rejected() {
        let mut repo = MockBookkeepingRepository::new();
        repo.expect_sum_revenue().never();

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .uri("/summary?from=2026-06-01T00:00:00Z&to=2026-05-01T00:00:00Z")
                    .header(AUTHORIZATION, bearer("owner", Some(Uuid::new_v4())))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
