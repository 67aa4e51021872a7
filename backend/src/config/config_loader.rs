use crate::config::stage::Stage;

use super::config_model::{
    AuthSecret, BackendServer, Billing, Cors, Database, DotEnvyConfig, Razorpay,
};
use anyhow::{Context, Result};
use gymdesk_core::payments::razorpay_client::DEFAULT_API_BASE;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND is invalid")?,
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
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS is invalid")?,
    };

    let auth = AuthSecret {
        jwt_secret: required("JWT_SECRET")?,
    };

    let razorpay = Razorpay {
        api_base: std::env::var("RAZORPAY_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
        key_id: required("RAZORPAY_KEY_ID")?,
        key_secret: required("RAZORPAY_KEY_SECRET")?,
        webhook_secret: required("RAZORPAY_WEBHOOK_SECRET")?,
    };

    let billing = Billing {
        currency: std::env::var("BILLING_CURRENCY").unwrap_or_else(|_| "INR".to_string()),
        grace_days: std::env::var("BILLING_GRACE_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .context("BILLING_GRACE_DAYS is invalid")?,
        trial_days: std::env::var("BILLING_TRIAL_DAYS")
            .unwrap_or_else(|_| "14".to_string())
            .parse()
            .context("BILLING_TRIAL_DAYS is invalid")?,
    };

    let cors = Cors {
        allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default(),
    };

    Ok(DotEnvyConfig {
        stage: get_stage(),
        backend_server,
        database,
        auth,
        razorpay,
        billing,
        cors,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" https://app.gymdesk.in/ ,, http://localhost:5173"),
            vec![
                "https://app.gymdesk.in".to_string(),
                "http://localhost:5173".to_string()
            ]
        );
        assert!(parse_origins("  ").is_empty());
    }
}
