use anyhow::Result;
use gymdesk_core::infra::db::{
    postgres::postgres_connection,
    repositories::{gym_subscriptions::GymSubscriptionPostgres, notifications::NotificationPostgres},
};
use std::sync::Arc;
use tracing::{error, info};
use worker::{
    axum_http, config, services::worker_loop,
    usecases::expire_subscriptions::ExpireSubscriptionsUseCase,
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Worker exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    gymdesk_core::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!(sweep = ?dotenvy_env.sweep, "ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.max_connections,
    )?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let expire_usecase = Arc::new(ExpireSubscriptionsUseCase::new(
        Arc::new(GymSubscriptionPostgres::new(Arc::clone(&db_pool_arc))),
        Arc::new(NotificationPostgres::new(Arc::clone(&db_pool_arc))),
        dotenvy_env.sweep.grace_days,
    ));

    let sweep_loop = tokio::spawn(worker_loop::run(
        Arc::clone(&expire_usecase),
        dotenvy_env.sweep.interval_secs,
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let http_server =
        tokio::spawn(async move { axum_http::http_serve::start(server_config, expire_usecase).await });

    tokio::select! {
        result = sweep_loop => result??,
        result = http_server => result??,
    };
    Ok(())
}
