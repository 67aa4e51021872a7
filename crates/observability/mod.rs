mod config;
mod layer;
mod notifier;
mod webhook_sink;

use anyhow::Result;
use config::ObservabilityConfig;
use layer::OpsAlertLayer;
use notifier::AlertDispatcher;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use webhook_sink::WebhookAlertSink;

/// Installs the global subscriber: fmt output filtered by `RUST_LOG` plus the
/// optional ops alert webhook. Must run inside a tokio runtime.
pub fn init_observability(component: &str) -> Result<()> {
    let config = ObservabilityConfig::from_env(component);

    let alert_layer = config.alerts.as_ref().map(|alerts| {
        let dispatcher = AlertDispatcher::new(vec![Arc::new(WebhookAlertSink::new(
            alerts.webhook_url.clone(),
        ))]);

        OpsAlertLayer::new(dispatcher, config.service_context.clone(), alerts.min_level).with_filter(
            tracing_subscriber::filter::LevelFilter::from_level(alerts.min_level),
        )
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Local time so `TZ=Asia/Kolkata` shows `+05:30`.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(alert_layer)
        .with(env_filter)
        .try_init()?;

    let context = &config.service_context;
    for warning in &config.warnings {
        warn!(
            service = %context.service_name,
            environment = %context.environment,
            component = %context.component,
            warning = %warning,
            "observability config warning"
        );
    }

    info!(
        service = %context.service_name,
        environment = %context.environment,
        component = %context.component,
        ops_alerts = config.alerts.is_some(),
        "observability initialized"
    );

    Ok(())
}
