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
        repositories::membership_plans::MembershipPlanRepository,
        value_objects::{
            enums::roles::Role,
            membership_plans::{
                CreateMembershipPlanModel, ListMembershipPlansQuery, UpdateMembershipPlanModel,
            },
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::membership_plans::MembershipPlanPostgres,
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppResult,
    usecases::membership_plans::MembershipPlanUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let membership_plan_repository = MembershipPlanPostgres::new(Arc::clone(&db_pool));
    let membership_plan_usecase = MembershipPlanUseCase::new(Arc::new(membership_plan_repository));

    router(Arc::new(membership_plan_usecase))
}

pub fn router<T>(membership_plan_usecase: Arc<MembershipPlanUseCase<T>>) -> Router
where
    T: MembershipPlanRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_plans::<T>).post(create_plan::<T>))
        .route("/:id", patch(update_plan::<T>))
        .route("/:id/deactivate", post(deactivate_plan::<T>))
        .with_state(membership_plan_usecase)
}

pub async fn list_plans<T>(
    State(membership_plan_usecase): State<Arc<MembershipPlanUseCase<T>>>,
    auth: AuthUser,
    Query(query): Query<ListMembershipPlansQuery>,
) -> AppResult<impl IntoResponse>
where
    T: MembershipPlanRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner, Role::Staff])?;
    let gym_id = auth.require_gym()?;

    Ok(Json(
        membership_plan_usecase
            .list_plans(gym_id, query.include_inactive)
            .await?,
    ))
}

pub async fn create_plan<T>(
    State(membership_plan_usecase): State<Arc<MembershipPlanUseCase<T>>>,
    auth: AuthUser,
    Json(model): Json<CreateMembershipPlanModel>,
) -> AppResult<impl IntoResponse>
where
    T: MembershipPlanRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner])?;
    let gym_id = auth.require_gym()?;
    let plan = membership_plan_usecase.create_plan(gym_id, model).await?;

    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn update_plan<T>(
    State(membership_plan_usecase): State<Arc<MembershipPlanUseCase<T>>>,
    auth: AuthUser,
    Path(plan_id): Path<Uuid>,
    Json(model): Json<UpdateMembershipPlanModel>,
) -> AppResult<impl IntoResponse>
where
    T: MembershipPlanRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner])?;
    let gym_id = auth.require_gym()?;

    Ok(Json(
        membership_plan_usecase
            .update_plan(gym_id, plan_id, model)
            .await?,
    ))
}

pub async fn deactivate_plan<T>(
    State(membership_plan_usecase): State<Arc<MembershipPlanUseCase<T>>>,
    auth: AuthUser,
    Path(plan_id): Path<Uuid>,
) -> AppResult<impl IntoResponse>
where
    T: MembershipPlanRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner])?;
    let gym_id = auth.require_gym()?;

    Ok(Json(
        membership_plan_usecase
            .deactivate_plan(gym_id, plan_id)
            .await?,
    ))
}
