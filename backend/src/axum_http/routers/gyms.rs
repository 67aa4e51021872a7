use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use gymdesk_core::{
    domain::{
        repositories::{gyms::GymRepository, saas_plans::SaasPlanRepository},
        value_objects::{
            enums::roles::Role,
            gyms::{CreateGymModel, UpdateGymModel},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{gyms::GymPostgres, saas_plans::SaasPlanPostgres},
    },
};

use crate::{
    auth::AuthUser, axum_http::error_responses::AppResult, usecases::gyms::GymUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, trial_days: i64) -> Router {
    let gym_repository = GymPostgres::new(Arc::clone(&db_pool));
    let plan_repository = SaasPlanPostgres::new(Arc::clone(&db_pool));
    let gym_usecase = GymUseCase::new(
        Arc::new(gym_repository),
        Arc::new(plan_repository),
        trial_days,
    );

    router(Arc::new(gym_usecase))
}

pub fn router<G, P>(gym_usecase: Arc<GymUseCase<G, P>>) -> Router
where
    G: GymRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(create_gym::<G, P>).get(list_gyms::<G, P>))
        .route("/me", get(get_my_gym::<G, P>).patch(update_my_gym::<G, P>))
        .with_state(gym_usecase)
}

pub async fn create_gym<G, P>(
    State(gym_usecase): State<Arc<GymUseCase<G, P>>>,
    auth: AuthUser,
    Json(model): Json<CreateGymModel>,
) -> AppResult<impl IntoResponse>
where
    G: GymRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::PlatformAdmin])?;
    let gym = gym_usecase.create_gym(model).await?;

    Ok((StatusCode::CREATED, Json(gym)))
}

pub async fn list_gyms<G, P>(
    State(gym_usecase): State<Arc<GymUseCase<G, P>>>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse>
where
    G: GymRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::PlatformAdmin])?;

    Ok(Json(gym_usecase.list_gyms().await?))
}

pub async fn get_my_gym<G, P>(
    State(gym_usecase): State<Arc<GymUseCase<G, P>>>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse>
where
    G: GymRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    let gym_id = auth.require_gym()?;

    Ok(Json(gym_usecase.get_gym(gym_id).await?))
}

pub async fn update_my_gym<G, P>(
    State(gym_usecase): State<Arc<GymUseCase<G, P>>>,
    auth: AuthUser,
    Json(model): Json<UpdateGymModel>,
) -> AppResult<impl IntoResponse>
where
    G: GymRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner])?;
    let gym_id = auth.require_gym()?;

    Ok(Json(gym_usecase.update_gym(gym_id, model).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{bearer, with_auth};
    use axum::{
        body::Body,
        http::{Request, header::AUTHORIZATION},
    };
    use chrono::Utc;
    use gymdesk_core::domain::{
        entities::gyms::GymEntity,
        repositories::{gyms::MockGymRepository, saas_plans::MockSaasPlanRepository},
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(gym_repo: MockGymRepository) -> Router {
        with_auth(router(Arc::new(GymUseCase::new(
            Arc::new(gym_repo),
            Arc::new(MockSaasPlanRepository::new()),
            14,
        ))))
    }

    #[tokio::test]
    async fn owner_reads_own_gym() {
        let gym_id = Uuid::new_v4();
        let mut gym_repo = MockGymRepository::new();
        gym_repo.expect_find_by_id().returning(|id| {
            let now = Utc::now();
            Ok(Some(GymEntity {
                id,
                name: "Iron Temple".to_string(),
                owner_user_id: Uuid::new_v4(),
                email: None,
                phone: None,
                address: None,
                created_at: now,
                updated_at: now,
            }))
        });

        let response = app(gym_repo)
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header(AUTHORIZATION, bearer("owner", Some(gym_id)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["id"], gym_id.to_string());
    }

    #[tokio::test]
    async fn owner_cannot_list_all_gyms() {
        let response = app(MockGymRepository::new())
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(AUTHORIZATION, bearer("owner", Some(Uuid::new_v4())))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn platform_admin_has_no_own_gym() {
        let response = app(MockGymRepository::new())
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header(AUTHORIZATION, bearer("platform_admin", None))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
