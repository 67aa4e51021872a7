use super::config_model::{Database, DotEnvyConfig, Sweep, WorkerServer};
use anyhow::{Context, Result};

pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: required("SERVER_PORT_WORKER")?
            .parse()
            .context("SERVER_PORT_WORKER is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "4".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS is invalid")?,
    };

    let sweep = Sweep {
        interval_secs: std::env::var("EXPIRY_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
        grace_days: std::env::var("BILLING_GRACE_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .context("BILLING_GRACE_DAYS is invalid")?,
        internal_token: non_empty(std::env::var("INTERNAL_WORKER_TOKEN").ok()),
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        sweep,
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is not set"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}
