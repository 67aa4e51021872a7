use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use gymdesk_core::domain::repositories::{
    gym_subscriptions::GymSubscriptionRepository, notifications::NotificationRepository,
};
use tracing::{error, warn};

use crate::usecases::expire_subscriptions::ExpireSubscriptionsUseCase;

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/sweep" \
//     -H "Authorization: Bearer $INTERNAL_WORKER_TOKEN"

pub struct SweepRouteState<S, N>
where
    S: GymSubscriptionRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    internal_token: Option<String>,
    usecase: Arc<ExpireSubscriptionsUseCase<S, N>>,
}

pub fn routes<S, N>(
    internal_token: Option<String>,
    usecase: Arc<ExpireSubscriptionsUseCase<S, N>>,
) -> Router
where
    S: GymSubscriptionRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/sweep", post(sweep::<S, N>))
        .with_state(Arc::new(SweepRouteState {
            internal_token,
            usecase,
        }))
}

pub async fn sweep<S, N>(
    State(state): State<Arc<SweepRouteState<S, N>>>,
    headers: HeaderMap,
) -> Response
where
    S: GymSubscriptionRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    let Some(expected_token) = state.internal_token.as_deref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "sweep token is not configured",
        )
            .into_response();
    };

    if let Err(status) = authorize_bearer(&headers, expected_token) {
        warn!("sweep: rejected trigger with bad token");
        return (status, "unauthorized").into_response();
    }

    match state.usecase.run().await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            error!(error = ?err, "sweep: usecase failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "sweep failed").into_response()
        }
    }
}

fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), StatusCode> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token == expected_token {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}
