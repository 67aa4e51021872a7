use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use gymdesk_core::{
    domain::{
        repositories::{attendance::AttendanceRepository, members::MemberRepository},
        value_objects::{
            attendance::{CheckInOutModel, ListAttendanceQuery},
            enums::roles::Role,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{attendance::AttendancePostgres, members::MemberPostgres},
    },
};

use crate::{
    auth::AuthUser, axum_http::error_responses::AppResult,
    usecases::attendance::AttendanceUseCase,
};

const ROLES: &[Role] = &[Role::Owner, Role::Staff];

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let attendance_repository = AttendancePostgres::new(Arc::clone(&db_pool));
    let member_repository = MemberPostgres::new(Arc::clone(&db_pool));
    let attendance_usecase =
        AttendanceUseCase::new(Arc::new(attendance_repository), Arc::new(member_repository));

    router(Arc::new(attendance_usecase))
}

pub fn router<A, M>(attendance_usecase: Arc<AttendanceUseCase<A, M>>) -> Router
where
    A: AttendanceRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_visits::<A, M>))
        .route("/today", get(today_summary::<A, M>))
        .route("/check-in", post(check_in::<A, M>))
        .route("/check-out", post(check_out::<A, M>))
        .with_state(attendance_usecase)
}

pub async fn check_in<A, M>(
    State(attendance_usecase): State<Arc<AttendanceUseCase<A, M>>>,
    auth: AuthUser,
    Json(model): Json<CheckInOutModel>,
) -> AppResult<impl IntoResponse>
where
    A: AttendanceRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;
    let visit = attendance_usecase
        .check_in(gym_id, model.member_id, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(visit)))
}

pub async fn check_out<A, M>(
    State(attendance_usecase): State<Arc<AttendanceUseCase<A, M>>>,
    auth: AuthUser,
    Json(model): Json<CheckInOutModel>,
) -> AppResult<impl IntoResponse>
where
    A: AttendanceRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;

    Ok(Json(
        attendance_usecase
            .check_out(gym_id, model.member_id, Utc::now())
            .await?,
    ))
}

pub async fn list_visits<A, M>(
    State(attendance_usecase): State<Arc<AttendanceUseCase<A, M>>>,
    auth: AuthUser,
    Query(query): Query<ListAttendanceQuery>,
) -> AppResult<impl IntoResponse>
where
    A: AttendanceRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;

    Ok(Json(attendance_usecase.list_visits(gym_id, query).await?))
}

pub async fn today_summary<A, M>(
    State(attendance_usecase): State<Arc<AttendanceUseCase<A, M>>>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse>
where
    A: AttendanceRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;

    Ok(Json(
        attendance_usecase.today_summary(gym_id, Utc::now()).await?,
    ))
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
    use gymdesk_core::domain::repositories::{
        attendance::MockAttendanceRepository, members::MockMemberRepository,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(attendance: MockAttendanceRepository, members: MockMemberRepository) -> Router {
        with_auth(router(Arc::new(AttendanceUseCase::new(
            Arc::new(attendance),
            Arc::new(members),
        ))))
    }

    #[tokio::test]
    async fn check_in_of_unknown_member_is_not_found() {
        let mut members = MockMemberRepository::new();
        members.expect_find_by_id().returning(|_, _| Ok(None));
        let mut attendance = MockAttendanceRepository::new();
        attendance.expect_check_in().never();

        let response = app(attendance, members)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/check-in")
                    .header(AUTHORIZATION, bearer("staff", Some(Uuid::new_v4())))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(format!(
                        r#"{{"member_id":"{}"}}"#,
                        Uuid::new_v4()
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn today_reports_counts() {
        let mut attendance = MockAttendanceRepository::new();
        attendance.expect_count_visits_since().returning(|_, _| Ok(12));
        attendance.expect_count_open_visits().returning(|_| Ok(3));

        let response = app(attendance, MockMemberRepository::new())
            .oneshot(
                Request::builder()
                    .uri("/today")
                    .header(AUTHORIZATION, bearer("owner", Some(Uuid::new_v4())))
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
        assert_eq!(json["visits_today"], 12);
        assert_eq!(json["currently_inside"], 3);
    }
}
