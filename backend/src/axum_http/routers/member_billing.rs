use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use gymdesk_core::{
    domain::{
        repositories::{
            member_billing::MemberBillingRepository, members::MemberRepository,
            membership_plans::MembershipPlanRepository,
        },
        value_objects::{
            enums::roles::Role,
            member_billing::{CreateInvoiceModel, ListInvoicesQuery, RecordPaymentModel},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            member_billing::MemberBillingPostgres, members::MemberPostgres,
            membership_plans::MembershipPlanPostgres,
        },
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppResult,
    usecases::member_billing::MemberBillingUseCase,
};

const ROLES: &[Role] = &[Role::Owner, Role::Staff];

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let billing_repository = MemberBillingPostgres::new(Arc::clone(&db_pool));
    let member_repository = MemberPostgres::new(Arc::clone(&db_pool));
    let membership_plan_repository = MembershipPlanPostgres::new(Arc::clone(&db_pool));
    let billing_usecase = MemberBillingUseCase::new(
        Arc::new(billing_repository),
        Arc::new(member_repository),
        Arc::new(membership_plan_repository),
    );

    router(Arc::new(billing_usecase))
}

pub fn router<B, M, MP>(billing_usecase: Arc<MemberBillingUseCase<B, M, MP>>) -> Router
where
    B: MemberBillingRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/invoices",
            get(list_invoices::<B, M, MP>).post(create_invoice::<B, M, MP>),
        )
        .route("/invoices/:id", get(get_invoice::<B, M, MP>))
        .route(
            "/invoices/:id/payments",
            post(record_payment::<B, M, MP>),
        )
        .route("/invoices/:id/void", post(void_invoice::<B, M, MP>))
        .with_state(billing_usecase)
}

pub async fn create_invoice<B, M, MP>(
    State(billing_usecase): State<Arc<MemberBillingUseCase<B, M, MP>>>,
    auth: AuthUser,
    Json(model): Json<CreateInvoiceModel>,
) -> AppResult<impl IntoResponse>
where
    B: MemberBillingRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;
    let invoice = billing_usecase
        .create_invoice(gym_id, model, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn list_invoices<B, M, MP>(
    State(billing_usecase): State<Arc<MemberBillingUseCase<B, M, MP>>>,
    auth: AuthUser,
    Query(query): Query<ListInvoicesQuery>,
) -> AppResult<impl IntoResponse>
where
    B: MemberBillingRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;

    Ok(Json(billing_usecase.list_invoices(gym_id, query).await?))
}

pub async fn get_invoice<B, M, MP>(
    State(billing_usecase): State<Arc<MemberBillingUseCase<B, M, MP>>>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<impl IntoResponse>
where
    B: MemberBillingRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;

    Ok(Json(billing_usecase.get_invoice(gym_id, invoice_id).await?))
}

pub async fn record_payment<B, M, MP>(
    State(billing_usecase): State<Arc<MemberBillingUseCase<B, M, MP>>>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(model): Json<RecordPaymentModel>,
) -> AppResult<impl IntoResponse>
where
    B: MemberBillingRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
{
    auth.require_role(ROLES)?;
    let gym_id = auth.require_gym()?;

    Ok(Json(
        billing_usecase
            .record_payment(gym_id, invoice_id, model, Utc::now())
            .await?,
    ))
}

pub async fn void_invoice<B, M, MP>(
    State(billing_usecase): State<Arc<MemberBillingUseCase<B, M, MP>>>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<impl IntoResponse>
where
    B: MemberBillingRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
{
    auth.require_role(&[Role::Owner])?;
    let gym_id = auth.require_gym()?;

    Ok(Json(billing_usecase.void_invoice(gym_id, invoice_id).await?))
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
        member_billing::MockMemberBillingRepository, members::MockMemberRepository,
        membership_plans::MockMembershipPlanRepository,
    };
    use tower::ServiceExt;

    fn app(billing: MockMemberBillingRepository) -> Router {
        with_auth(router(Arc::new(MemberBillingUseCase::new(
            Arc::new(billing),
            Arc::new(MockMemberRepository::new()),
            Arc::new(MockMembershipPlanRepository::new()),
        ))))
    }

    #[tokio::test]
    async fn staff_cannot_void_invoices() {
        let response = app(MockMemberBillingRepository::new())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/invoices/{}/void", Uuid::new_v4()))
                    .header(AUTHORIZATION, bearer("staff", Some(Uuid::new_v4())))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn non_positive_payment_is_rejected() {
        let response = app(MockMemberBillingRepository::new())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/invoices/{}/payments", Uuid::new_v4()))
                    .header(AUTHORIZATION, bearer("staff", Some(Uuid::new_v4())))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"amount_minor":0,"method":"cash"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
