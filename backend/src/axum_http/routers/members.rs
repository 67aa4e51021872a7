use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use gymdesk_core::{
    domain::{
        repositories::{
            gym_subscriptions::GymSubscriptionRepository, members::MemberRepository,
            membership_plans::MembershipPlanRepository, saas_plans::SaasPlanRepository,
        },
        value_objects::{
            enums::roles::Role,
            members::{CreateMemberModel, ListMembersQuery, UpdateMemberModel},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            gym_subscriptions::GymSubscriptionPostgres, members::MemberPostgres,
            membership_plans::MembershipPlanPostgres, saas_plans::SaasPlanPostgres,
        },
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppResult,
    usecases::{access_resolver::AccessResolver, members::MemberUseCase},
};

const ROLES: &[Role] = &[Role::Owner, Role::Staff];

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let member_repository = MemberPostgres::new(Arc::clone(&db_pool));
    let membership_plan_repository = MembershipPlanPostgres::new(Arc::clone(&db_pool));
    let access_resolver = AccessResolver::new(
        Arc::new(GymSubscriptionPostgres::new(Arc::clone(&db_pool))),
        Arc::new(SaasPlanPostgres::new(Arc::clone(&db_pool))),
    );
    let member_usecase = MemberUseCase::new(
        Arc::new(member_repository),
        Arc::new(membership_plan_repository),
        access_resolver,
    );

    router(Arc::new(member_usecase))
}

pub fn router<M, MP, S, P>(member_usecase: Arc<MemberUseCase<M, MP, S, P>>) -> Router
where
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            get(list_members::<M, MP, S, P>).post(create_member::<M, MP, S, P>),
        )
        .route(
            "/:id",
            get(get_member::<M, MP, S, P>)
                .patch(update_member::<M, MP, S, P>)
                .delete(archive_member::<M, MP, S, P>),
        )
        .with_state(member_usecase)
}

pub async fn create_member<M, MP, S, P>(
    State(member_usecase): State<Arc<MemberUseCase<M, MP, S, P>>>,
    auth: AuthUser,
    Json(model): Json<CreateMemberModel>,
) -> AppResult<impl IntoResponse>
where
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;
    let member = member_usecase.create_member(gym_id, model, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn list_members<M, MP, S, P>(
    State(member_usecase): State<Arc<MemberUseCase<M, MP, S, P>>>,
    auth: AuthUser,
    Query(query): Query<ListMembersQuery>,
) -> AppResult<impl IntoResponse>
where
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;

    Ok(Json(
        member_usecase.list_members(gym_id, query, Utc::now()).await?,
    ))
}

pub async fn get_member<M, MP, S, P>(
    State(member_usecase): State<Arc<MemberUseCase<M, MP, S, P>>>,
    auth: AuthUser,
    Path(member_id): Path<Uuid>,
) -> AppResult<impl IntoResponse>
where
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;

    Ok(Json(
        member_usecase.get_member(gym_id, member_id, Utc::now()).await?,
    ))
}

pub async fn update_member<M, MP, S, P>(
    State(member_usecase): State<Arc<MemberUseCase<M, MP, S, P>>>,
    auth: AuthUser,
    Path(member_id): Path<Uuid>,
    Json(model): Json<UpdateMemberModel>,
) -> AppResult<impl IntoResponse>
where
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;

    Ok(Json(
        member_usecase
            .update_member(gym_id, member_id, model, Utc::now())
            .await?,
    ))
}

pub async fn archive_member<M, MP, S, P>(
    State(member_usecase): State<Arc<MemberUseCase<M, MP, S, P>>>,
    auth: AuthUser,
    Path(member_id): Path<Uuid>,
) -> AppResult<impl IntoResponse>
where
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;
    member_usecase
        .archive_member(gym_id, member_id, Utc::now())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{bearer, with_auth};
    use axum::{
        body::Body,
        http::{Request, header::{AUTHORIZATION, CONTENT_TYPE}},
    };
    use chrono::Duration;
    use gymdesk_core::domain::{
        entities::gym_subscriptions::GymSubscriptionEntity,
        repositories::{
            gym_subscriptions::MockGymSubscriptionRepository, members::MockMemberRepository,
            membership_plans::MockMembershipPlanRepository, saas_plans::MockSaasPlanRepository,
        },
    };
    use tower::ServiceExt;

    fn app(
        members: MockMemberRepository,
        subscriptions: MockGymSubscriptionRepository,
        plans: MockSaasPlanRepository,
    ) -> Router {
        with_auth(router(Arc::new(MemberUseCase::new(
            Arc::new(members),
            Arc::new(MockMembershipPlanRepository::new()),
            AccessResolver::new(Arc::new(subscriptions), Arc::new(plans)),
        ))))
    }

    #[tokio::test]
    async fn request_without_token_is_unauthorized() {
        let response = app(
            MockMemberRepository::new(),
            MockGymSubscriptionRepository::new(),
            MockSaasPlanRepository::new(),
        )
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn lapsed_gym_cannot_add_members() {
        let mut subscriptions = MockGymSubscriptionRepository::new();
        subscriptions.expect_find_by_gym().returning(|gym_id| {
            let now = Utc::now();
            Ok(Some(GymSubscriptionEntity {
                id: Uuid::new_v4(),
                gym_id,
                plan_id: Uuid::new_v4(),
                status: "expired".to_string(),
                current_period_start: now - Duration::days(60),
                current_period_end: now - Duration::days(30),
                grace_ends_at: None,
                cancel_at_period_end: false,
                scheduled_plan_id: None,
                created_at: now,
                updated_at: now,
            }))
        });
        let mut plans = MockSaasPlanRepository::new();
        plans.expect_find_by_id().returning(|_| Ok(None));
        let mut members = MockMemberRepository::new();
        members.expect_create_member().never();

        let response = app(members, subscriptions, plans)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(AUTHORIZATION, bearer("staff", Some(Uuid::new_v4())))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"full_name":"Ravi","phone":"9800000001"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains("subscription inactive"));
    }

    #[tokio::test]
    async fn archiving_returns_no_content() {
        let mut members = MockMemberRepository::new();
        members.expect_update_member().returning(|gym_id, id, _| {
            let now = Utc::now();
            Ok(Some(gymdesk_core::domain::entities::members::MemberEntity {
                id,
                gym_id,
                full_name: "Ravi".to_string(),
                email: None,
                phone: "9800000001".to_string(),
                membership_plan_id: None,
                membership_start: None,
                membership_end: None,
                status: "archived".to_string(),
                joined_at: now,
                created_at: now,
                updated_at: now,
            }))
        });

        let response = app(
            members,
            MockGymSubscriptionRepository::new(),
            MockSaasPlanRepository::new(),
        )
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/{}", Uuid::new_v4()))
                .header(AUTHORIZATION, bearer("owner", Some(Uuid::new_v4())))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
