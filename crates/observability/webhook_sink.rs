use super::notifier::{AlertEvent, AlertSink};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::json;
use url::Url;

/// Posts alerts as `{"text": ...}`, the shape chat incoming-webhooks accept.
pub(crate) struct WebhookAlertSink {
    webhook_url: Url,
    client: Client,
}

impl WebhookAlertSink {
    pub(crate) fn new(webhook_url: Url) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(3))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            webhook_url,
            client,
        }
    }
}

pub(crate) fn format_alert(event: &AlertEvent) -> String {
    let mut lines = vec![
        format!(
            "[{}] {} / {} / {}",
            event.level.as_str(),
            event.service_name,
            event.environment,
            event.component
        ),
        format!(
            "{} {}{}",
            event.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            event.target,
            match (&event.file, event.line) {
                (Some(file), Some(line)) => format!(" ({}:{})", file, line),
                _ => String::new(),
            }
        ),
    ];

    if let Some(message) = event.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        lines.push(message.to_string());
    }

    for (key, value) in &event.fields {
        lines.push(format!("  {} = {}", key, value));
    }

    for span in event.spans.iter().filter(|s| !s.fields.is_empty()) {
        lines.push(format!("  in {}:", span.name));
        for (key, value) in &span.fields {
            lines.push(format!("    {} = {}", key, value));
        }
    }

    truncate(lines.join("\n"))
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    async fn send(&self, event: &AlertEvent) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&json!({ "text": format_alert(event) }))
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "alert webhook returned non-success status: {}",
            response.status()
        ))
    }

    fn sink_name(&self) -> &'static str {
        "webhook"
    }
}

// reqwest errors carry the URL, which carries the token.
fn sanitize_reqwest_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("alert webhook request timed out");
    }
    if error.is_connect() {
        return anyhow!("alert webhook connection failed");
    }
    anyhow!("alert webhook request failed")
}

fn truncate(content: String) -> String {
    const LIMIT: usize = 2000;
    const SUFFIX: &str = "\n(truncated)";

    if content.chars().count() <= LIMIT {
        return content;
    }

    let allowed = LIMIT.saturating_sub(SUFFIX.chars().count());
    let mut truncated: String = content.chars().take(allowed).collect();
    truncated.push_str(SUFFIX);
    truncated
}
