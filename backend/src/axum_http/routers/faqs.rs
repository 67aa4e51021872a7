use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::Utc;
use gymdesk_core::{
    domain::{
        repositories::faqs::FaqRepository,
        value_objects::{
            enums::roles::Role,
            faqs::{CreateFaqModel, UpdateFaqModel},
        },
    },
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::faqs::FaqPostgres},
};
use uuid::Uuid;

use crate::{auth::AuthUser, axum_http::error_responses::AppResult, usecases::faqs::FaqUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let faq_repository = FaqPostgres::new(db_pool);
    let faq_usecase = FaqUseCase::new(Arc::new(faq_repository));

    router(Arc::new(faq_usecase))
}

/// `GET /` is public. Everything else is platform admin only.
pub fn router<T>(faq_usecase: Arc<FaqUseCase<T>>) -> Router
where
    T: FaqRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_published::<T>).post(create_faq::<T>))
        .route("/all", get(list_all::<T>))
        .route("/:id", patch(update_faq::<T>).delete(delete_faq::<T>))
        .with_state(faq_usecase)
}

pub async fn list_published<T>(
    State(faq_usecase): State<Arc<FaqUseCase<T>>>,
) -> AppResult<impl IntoResponse>
where
    T: FaqRepository + Send + Sync + 'static,
{
    Ok(Json(faq_usecase.list_published().await?))
}

pub async fn list_all<T>(
    State(faq_usecase): State<Arc<FaqUseCase<T>>>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse>
where
    T: FaqRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::PlatformAdmin])?;

    Ok(Json(faq_usecase.list_all().await?))
}

pub async fn create_faq<T>(
    State(faq_usecase): State<Arc<FaqUseCase<T>>>,
    auth: AuthUser,
    Json(model): Json<CreateFaqModel>,
) -> AppResult<impl IntoResponse>
where
    T: FaqRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::PlatformAdmin])?;
    let faq = faq_usecase.create_faq(model).await?;

    Ok((StatusCode::CREATED, Json(faq)))
}

pub async fn update_faq<T>(
    State(faq_usecase): State<Arc<FaqUseCase<T>>>,
    auth: AuthUser,
    Path(faq_id): Path<Uuid>,
    Json(model): Json<UpdateFaqModel>,
) -> AppResult<impl IntoResponse>
where
    T: FaqRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::PlatformAdmin])?;

    Ok(Json(faq_usecase.update_faq(faq_id, model, Utc::now()).await?))
}

pub async fn delete_faq<T>(
    State(faq_usecase): State<Arc<FaqUseCase<T>>>,
    auth: AuthUser,
    Path(faq_id): Path<Uuid>,
) -> AppResult<impl IntoResponse>
where
    T: FaqRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::PlatformAdmin])?;
    faq_usecase.delete_faq(faq_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{bearer, with_auth};
    use axum::{
        body::Body,
        http::{
            Request,
            header::{AUTHORIZATION, CONTENT_TYPE},
        },
    };
    use gymdesk_core::domain::repositories::faqs::MockFaqRepository;
    use mockall::predicate::eq;
    use tower::ServiceExt;

    fn app(repo: MockFaqRepository) -> Router {
        with_auth(router(Arc::new(FaqUseCase::new(Arc::new(repo)))))
    }

    #[tokio::test]
    async fn published_list_needs_no_token() {
        let mut repo = MockFaqRepository::new();
        repo.expect_list_faqs()
            .with(eq(true))
            .times(1)
            .returning(|_| Ok(vec![]));

        let response = app(repo)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn gym_owner_cannot_author_faqs() {
        let mut repo = MockFaqRepository::new();
        repo.expect_create_faq().never();

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(AUTHORIZATION, bearer("owner", Some(Uuid::new_v4())))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"question":"Q?","answer":"A."}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
