use crate::{
    auth::AuthKeys,
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
};
use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use gymdesk_core::{
    infra::db::postgres::postgres_connection::PgPoolSquad,
    payments::razorpay_client::RazorpayClient,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

pub fn api_router(config: &DotEnvyConfig, db_pool: Arc<PgPoolSquad>) -> Router {
    let gateway = Arc::new(RazorpayClient::new(
        config.razorpay.api_base.clone(),
        config.razorpay.key_id.clone(),
        config.razorpay.key_secret.clone(),
        config.razorpay.webhook_secret.clone(),
    ));

    Router::new()
        .nest(
            "/gyms",
            routers::gyms::routes(Arc::clone(&db_pool), config.billing.trial_days),
        )
        .nest(
            "/membership-plans",
            routers::membership_plans::routes(Arc::clone(&db_pool)),
        )
        .nest("/members", routers::members::routes(Arc::clone(&db_pool)))
        .nest("/staff", routers::staff::routes(Arc::clone(&db_pool)))
        .nest(
            "/attendance",
            routers::attendance::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/billing",
            routers::member_billing::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/bookkeeping",
            routers::bookkeeping::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/support-tickets",
            routers::support_tickets::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/notifications",
            routers::notifications::routes(Arc::clone(&db_pool)),
        )
        .nest("/faqs", routers::faqs::routes(Arc::clone(&db_pool)))
        .nest(
            "/saas",
            routers::saas::routes(
                Arc::clone(&db_pool),
                gateway,
                config.billing.currency.clone(),
            ),
        )
        .route("/health-check", get(default_routers::health_check))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "http_serve: ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let auth_keys = Arc::new(AuthKeys::new(&config.auth.jwt_secret));

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest("/api/v1", api_router(&config, db_pool))
        .layer(Extension(auth_keys))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024)
                .try_into()
                .context("SERVER_BODY_LIMIT does not fit in memory")?,
        ))
        .layer(cors_layer(&config.cors.allowed_origins))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(
        port = config.backend_server.port,
        stage = %config.stage,
        "Server is running"
    );
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
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
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
