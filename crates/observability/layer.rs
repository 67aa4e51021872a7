use super::config::ServiceContext;
use super::notifier::{AlertDispatcher, AlertEvent, DISPATCH_TARGET, SpanSummary};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Forwards events at or above `min_level` to the ops alert sinks.
#[derive(Clone)]
pub(crate) struct OpsAlertLayer {
    dispatcher: AlertDispatcher,
    service_context: ServiceContext,
    min_level: Level,
}

impl OpsAlertLayer {
    pub(crate) fn new(
        dispatcher: AlertDispatcher,
        service_context: ServiceContext,
        min_level: Level,
    ) -> Self {
        Self {
            dispatcher,
            service_context,
            min_level,
        }
    }
}

#[derive(Default)]
struct FieldMapVisitor {
    values: BTreeMap<String, String>,
}

impl FieldMapVisitor {
    fn insert(&mut self, field: &Field, value: String) {
        self.values
            .insert(field.name().to_string(), redact(field.name(), value));
    }
}

impl Visit for FieldMapVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.to_string());
    }
}

#[derive(Default)]
struct SpanFieldMap {
    values: BTreeMap<String, String>,
}

impl<S> Layer<S> for OpsAlertLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: Context<'_, S>,
    ) {
        let mut visitor = FieldMapVisitor::default();
        attrs.record(&mut visitor);

        if visitor.values.is_empty() {
            return;
        }

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFieldMap {
                values: visitor.values,
            });
        }
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        ctx: Context<'_, S>,
    ) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut visitor = FieldMapVisitor::default();
        values.record(&mut visitor);

        if visitor.values.is_empty() {
            return;
        }

        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<SpanFieldMap>() {
            Some(existing) => existing.values.extend(visitor.values),
            None => extensions.insert(SpanFieldMap {
                values: visitor.values,
            }),
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Delivery failures of the dispatcher itself must not loop back into it.
        if *metadata.level() > self.min_level || metadata.target() == DISPATCH_TARGET {
            return;
        }

        let mut visitor = FieldMapVisitor::default();
        event.record(&mut visitor);

        let message = visitor
            .values
            .remove("message")
            .map(|raw| unquote_debug_string(&raw));

        let spans = ctx
            .event_span(event)
            .map(|span| {
                span.scope()
                    .from_root()
                    .map(|s| SpanSummary {
                        name: s.metadata().name().to_string(),
                        fields: s
                            .extensions()
                            .get::<SpanFieldMap>()
                            .map(|m| m.values.clone())
                            .unwrap_or_default(),
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        self.dispatcher.try_dispatch(AlertEvent {
            level: *metadata.level(),
            timestamp: Utc::now(),
            service_name: self.service_context.service_name.clone(),
            environment: self.service_context.environment.clone(),
            component: self.service_context.component.clone(),
            target: metadata.target().to_string(),
            file: metadata.file().map(|f| f.to_string()),
            line: metadata.line(),
            message,
            fields: visitor.values,
            spans,
        });
    }
}

fn unquote_debug_string(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        return trimmed[1..trimmed.len() - 1].to_string();
    }
    trimmed.to_string()
}

fn redact(field_name: &str, value: String) -> String {
    if is_sensitive_key(field_name) {
        return "[REDACTED]".to_string();
    }
    value
}

fn is_sensitive_key(field_name: &str) -> bool {
    let field = field_name.to_ascii_lowercase();
    ["secret", "password", "token", "authorization", "signature", "webhook_url"]
        .iter()
        .any(|needle| field.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signatures_and_tokens_are_redacted() {
        assert_eq!(redact("x_razorpay_signature", "abc".into()), "[REDACTED]");
        assert_eq!(redact("INTERNAL_WORKER_TOKEN", "abc".into()), "[REDACTED]");
        assert_eq!(redact("gateway_order_id", "order_1".into()), "order_1");
    }

    #[test]
    fn debug_quotes_are_stripped_from_messages() {
        assert_eq!(unquote_debug_string("\"hello\""), "hello");
        assert_eq!(unquote_debug_string("\""), "\"");
    }
}
