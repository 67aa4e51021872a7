use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
    usecases::expire_subscriptions::ExpireSubscriptionsUseCase,
};
use anyhow::{Context, Result};
use axum::{Router, routing::get};
use gymdesk_core::domain::repositories::{
    gym_subscriptions::GymSubscriptionRepository, notifications::NotificationRepository,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

pub async fn start<S, N>(
    config: Arc<DotEnvyConfig>,
    usecase: Arc<ExpireSubscriptionsUseCase<S, N>>,
) -> Result<()>
where
    S: GymSubscriptionRepository + Send + Sync + 'static,
    N: NotificationRepository + Send + Sync + 'static,
{
    if config.sweep.internal_token.is_none() {
        warn!("INTERNAL_WORKER_TOKEN is not set, the sweep trigger will answer 503");
    }

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/internal/v1",
            routers::sweep::routes(config.sweep.internal_token.clone(), usecase),
        )
        .route("/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.worker_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.worker_server.body_limit * 1024 * 1024)
                .try_into()
                .context("SERVER_BODY_LIMIT does not fit in memory")?,
        ))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.worker_server.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Worker HTTP server running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
