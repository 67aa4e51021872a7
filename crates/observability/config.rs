use std::env;
use tracing::Level;
use url::Url;

#[derive(Clone, Debug)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone, Debug)]
pub(crate) struct AlertWebhookConfig {
    pub(crate) webhook_url: Url,
    pub(crate) min_level: Level,
}

#[derive(Clone, Debug)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) alerts: Option<AlertWebhookConfig>,
    /// Logged once tracing is up.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| env::var(key).ok())
    }

    fn from_lookup(component: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let component = component.trim().to_string();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let service_context = ServiceContext {
            service_name: non_empty("SERVICE_NAME").unwrap_or_else(|| component.clone()),
            environment: non_empty("STAGE").unwrap_or_else(|| "unknown".to_string()),
            component,
        };

        let mut warnings = Vec::new();
        let alerts = alerts_from(&non_empty, &mut warnings);

        Self {
            service_context,
            alerts,
            warnings,
        }
    }
}

fn alerts_from(
    lookup: &impl Fn(&str) -> Option<String>,
    warnings: &mut Vec<String>,
) -> Option<AlertWebhookConfig> {
    let enabled = lookup("OPS_ALERT_ENABLED")
        .and_then(|raw| parse_bool(&raw))
        .unwrap_or(true);
    if !enabled {
        return None;
    }

    let raw_url = lookup("OPS_ALERT_WEBHOOK_URL")?;
    let webhook_url = match Url::parse(raw_url.trim()) {
        Ok(url) => url,
        Err(err) => {
            // The URL usually embeds a token, keep it out of the logs.
            warnings.push(format!(
                "OPS_ALERT_WEBHOOK_URL is set but invalid; ops alerts disabled (parse error: {err})"
            ));
            return None;
        }
    };

    let min_level = match lookup("OPS_ALERT_LEVEL") {
        Some(raw) => parse_level(&raw).unwrap_or_else(|| {
            warnings.push(format!(
                "OPS_ALERT_LEVEL is invalid (value: {raw}); defaulting to ERROR"
            ));
            Level::ERROR
        }),
        None => Level::ERROR,
    };

    Some(AlertWebhookConfig {
        webhook_url,
        min_level,
    })
}

fn parse_level(input: &str) -> Option<Level> {
    match input.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
