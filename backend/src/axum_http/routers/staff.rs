use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use gymdesk_core::{
    domain::{
        repositories::staff::StaffRepository,
        value_objects::{
            enums::roles::Role,
            staff::{CreateStaffModel, UpdateStaffModel},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::staff::StaffPostgres,
    },
};
use uuid::Uuid;

use crate::{auth::AuthUser, axum_http::error_responses::AppResult, usecases::staff::StaffUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let staff_repository = StaffPostgres::new(db_pool);
    let staff_usecase = StaffUseCase::new(Arc::new(staff_repository));

    router(Arc::new(staff_usecase))
}

pub fn router<T>(staff_usecase: Arc<StaffUseCase<T>>) -> Router
where
    T: StaffRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_staff::<T>).post(create_staff::<T>))
        .route(
            "/:id",
            get(get_staff::<T>)
                .patch(update_staff::<T>)
                .delete(delete_staff::<T>),
        )
        .with_state(staff_usecase)
}

pub async fn list_staff<T>(
    State(staff_usecase): State<Arc<StaffUseCase<T>>>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse>
where
    T: StaffRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner, Role::Staff])?;
    let gym_id = auth.require_gym()?;

    Ok(Json(staff_usecase.list_staff(gym_id).await?))
}

pub async fn get_staff<T>(
    State(staff_usecase): State<Arc<StaffUseCase<T>>>,
    auth: AuthUser,
    Path(staff_id): Path<Uuid>,
) -> AppResult<impl IntoResponse>
where
    T: StaffRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner, Role::Staff])?;
    let gym_id = auth.require_gym()?;

    Ok(Json(staff_usecase.get_staff(gym_id, staff_id).await?))
}

pub async fn create_staff<T>(
    State(staff_usecase): State<Arc<StaffUseCase<T>>>,
    auth: AuthUser,
    Json(model): Json<CreateStaffModel>,
) -> AppResult<impl IntoResponse>
where
    T: StaffRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner])?;
    let gym_id = auth.require_gym()?;
    let staff = staff_usecase.create_staff(gym_id, model).await?;

    Ok((StatusCode::CREATED, Json(staff)))
}

pub async fn update_staff<T>(
    State(staff_usecase): State<Arc<StaffUseCase<T>>>,
    auth: AuthUser,
    Path(staff_id): Path<Uuid>,
    Json(model): Json<UpdateStaffModel>,
) -> AppResult<impl IntoResponse>
where
    T: StaffRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner])?;
    let gym_id = auth.require_gym()?;

    Ok(Json(
        staff_usecase
            .update_staff(gym_id, staff_id, model, Utc::now())
            .await?,
    ))
}

pub async fn delete_staff<T>(
    State(staff_usecase): State<Arc<StaffUseCase<T>>>,
    auth: AuthUser,
    Path(staff_id): Path<Uuid>,
) -> AppResult<impl IntoResponse>
where
    T: StaffRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner])?;
    let gym_id = auth.require_gym()?;
    staff_usecase.delete_staff(gym_id, staff_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
