use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use gymdesk_core::{
    domain::{
        repositories::{
            gateway_orders::GatewayOrderRepository, gym_subscriptions::GymSubscriptionRepository,
            saas_plans::SaasPlanRepository, webhook_events::WebhookEventRepository,
        },
        value_objects::{
            enums::roles::Role,
            subscriptions::{CreateOrderRequest, VerifyPaymentRequest},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            gateway_orders::GatewayOrderPostgres, gym_subscriptions::GymSubscriptionPostgres,
            saas_plans::SaasPlanPostgres, webhook_events::WebhookEventPostgres,
        },
    },
    payments::razorpay_client::RazorpayClient,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::ErrorResponse,
    usecases::saas_billing::{PaymentGateway, SaasBillingUseCase, UseCaseResult},
};

pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";
pub const EVENT_ID_HEADER: &str = "x-razorpay-event-id";

type SaasState<P, S, O, W, G> = State<Arc<SaasBillingUseCase<P, S, O, W, G>>>;

pub fn routes(db_pool: Arc<PgPoolSquad>, gateway: Arc<RazorpayClient>, currency: String) -> Router {
    let saas_usecase = SaasBillingUseCase::new(
        Arc::new(SaasPlanPostgres::new(Arc::clone(&db_pool))),
        Arc::new(GymSubscriptionPostgres::new(Arc::clone(&db_pool))),
        Arc::new(GatewayOrderPostgres::new(Arc::clone(&db_pool))),
        Arc::new(WebhookEventPostgres::new(Arc::clone(&db_pool))),
        gateway,
        currency,
    );

    router(Arc::new(saas_usecase))
}

/// `POST /webhook` is authenticated by the gateway signature, not a token.
pub fn router<P, S, O, W, G>(saas_usecase: Arc<SaasBillingUseCase<P, S, O, W, G>>) -> Router
where
    P: SaasPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    O: GatewayOrderRepository + Send + Sync + 'static,
    W: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    Router::new()
        .route("/plans", get(list_plans::<P, S, O, W, G>))
        .route("/subscription", get(current::<P, S, O, W, G>))
        .route(
            "/orders",
            get(list_orders::<P, S, O, W, G>).post(create_order::<P, S, O, W, G>),
        )
        .route("/verify", post(verify_payment::<P, S, O, W, G>))
        .route("/cancel", post(cancel::<P, S, O, W, G>))
        .route("/resume", post(resume::<P, S, O, W, G>))
        .route("/webhook", post(webhook::<P, S, O, W, G>))
        .with_state(saas_usecase)
}

fn respond<T: Serialize>(result: UseCaseResult<T>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => err.into_response(),
    }
}

fn tenant_gym(auth: &AuthUser) -> Result<Uuid, Response> {
    auth.require_role(&[Role::Owner])
        .and_then(|_| auth.require_gym())
        .map_err(IntoResponse::into_response)
}

pub async fn list_plans<P, S, O, W, G>(
    State(saas_usecase): SaasState<P, S, O, W, G>,
    _auth: AuthUser,
) -> Response
where
    P: SaasPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    O: GatewayOrderRepository + Send + Sync + 'static,
    W: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    respond(saas_usecase.list_plans().await)
}

pub async fn current<P, S, O, W, G>(
    State(saas_usecase): SaasState<P, S, O, W, G>,
    auth: AuthUser,
) -> Response
where
    P: SaasPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    O: GatewayOrderRepository + Send + Sync + 'static,
    W: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    // Staff may look at the plan, only owners change it.
    let gym_id = match auth.require_gym() {
        Ok(gym_id) => gym_id,
        Err(err) => return err.into_response(),
    };

    respond(saas_usecase.current(gym_id, Utc::now()).await)
}

pub async fn list_orders<P, S, O, W, G>(
    State(saas_usecase): SaasState<P, S, O, W, G>,
    auth: AuthUser,
) -> Response
where
    P: SaasPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    O: GatewayOrderRepository + Send + Sync + 'static,
    W: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let gym_id = match tenant_gym(&auth) {
        Ok(gym_id) => gym_id,
        Err(response) => return response,
    };

    respond(saas_usecase.list_orders(gym_id).await)
}

pub async fn create_order<P, S, O, W, G>(
    State(saas_usecase): SaasState<P, S, O, W, G>,
    auth: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Response
where
    P: SaasPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    O: GatewayOrderRepository + Send + Sync + 'static,
    W: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let gym_id = match tenant_gym(&auth) {
        Ok(gym_id) => gym_id,
        Err(response) => return response,
    };

    match saas_usecase
        .create_order(gym_id, request.plan_id, Utc::now())
        .await
    {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn verify_payment<P, S, O, W, G>(
    State(saas_usecase): SaasState<P, S, O, W, G>,
    auth: AuthUser,
    Json(request): Json<VerifyPaymentRequest>,
) -> Response
where
    P: SaasPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    O: GatewayOrderRepository + Send + Sync + 'static,
    W: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let gym_id = match tenant_gym(&auth) {
        Ok(gym_id) => gym_id,
        Err(response) => return response,
    };

    respond(saas_usecase.verify_payment(gym_id, request, Utc::now()).await)
}

pub async fn cancel<P, S, O, W, G>(
    State(saas_usecase): SaasState<P, S, O, W, G>,
    auth: AuthUser,
) -> Response
where
    P: SaasPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    O: GatewayOrderRepository + Send + Sync + 'static,
    W: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let gym_id = match tenant_gym(&auth) {
        Ok(gym_id) => gym_id,
        Err(response) => return response,
    };

    respond(saas_usecase.cancel(gym_id, Utc::now()).await)
}

pub async fn resume<P, S, O, W, G>(
    State(saas_usecase): SaasState<P, S, O, W, G>,
    auth: AuthUser,
) -> Response
where
    P: SaasPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    O: GatewayOrderRepository + Send + Sync + 'static,
    W: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let gym_id = match tenant_gym(&auth) {
        Ok(gym_id) => gym_id,
        Err(response) => return response,
    };

    respond(saas_usecase.resume(gym_id, Utc::now()).await)
}

pub async fn webhook<P, S, O, W, G>(
    State(saas_usecase): SaasState<P, S, O, W, G>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    P: SaasPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    O: GatewayOrderRepository + Send + Sync + 'static,
    W: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        warn!("saas: webhook without signature header");
        return ErrorResponse::into_response_with(
            StatusCode::BAD_REQUEST,
            "missing signature header",
        );
    };
    let event_id = headers
        .get(EVENT_ID_HEADER)
        .and_then(|value| value.to_str().ok());

    match saas_usecase
        .handle_webhook(&body, signature, event_id, Utc::now())
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(json!({ "status": outcome }))).into_response(),
        Err(err) => err.into_response(),
    }
}
