use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;
use tracing::warn;

#[derive(Clone, Debug)]
pub(crate) struct SpanSummary {
    pub(crate) name: String,
    pub(crate) fields: BTreeMap<String, String>,
}

#[derive(Clone, Debug)]
pub(crate) struct AlertEvent {
    pub(crate) level: Level,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
    pub(crate) target: String,
    pub(crate) file: Option<String>,
    pub(crate) line: Option<u32>,
    pub(crate) message: Option<String>,
    pub(crate) fields: BTreeMap<String, String>,
    pub(crate) spans: Vec<SpanSummary>,
}

#[async_trait]
pub(crate) trait AlertSink: Send + Sync {
    async fn send(&self, event: &AlertEvent) -> Result<()>;
    fn sink_name(&self) -> &'static str;
}

/// Fans alerts out to the sinks on a background task so logging never waits on HTTP.
#[derive(Clone)]
pub(crate) struct AlertDispatcher {
    tx: mpsc::Sender<AlertEvent>,
}

pub(crate) const DISPATCH_TARGET: &str = "gymdesk_core::observability::dispatch";

impl AlertDispatcher {
    pub(crate) fn new(sinks: Vec<Arc<dyn AlertSink>>) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertEvent>(256);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                for sink in &sinks {
                    if let Err(error) = sink.send(&event).await {
                        warn!(
                            target: DISPATCH_TARGET,
                            sink = sink.sink_name(),
                            error = %error,
                            "ops alert delivery failed"
                        );
                    }
                }
            }
        });

        Self { tx }
    }

    pub(crate) fn try_dispatch(&self, event: AlertEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(target: DISPATCH_TARGET, "ops alert queue full; dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(target: DISPATCH_TARGET, "ops alert queue closed; dropping event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingSink {
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn send(&self, event: &AlertEvent) -> Result<()> {
            self.seen
                .lock()
                .unwrap()
                .push(event.message.clone().unwrap_or_default());
            Ok(())
        }

        fn sink_name(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn dispatched_events_reach_every_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = AlertDispatcher::new(vec![
            Arc::new(RecordingSink { seen: Arc::clone(&seen) }),
            Arc::new(RecordingSink { seen: Arc::clone(&seen) }),
        ]);

        dispatcher.try_dispatch(AlertEvent {
            level: Level::ERROR,
            timestamp: Utc::now(),
            service_name: "svc".to_string(),
            environment: "test".to_string(),
            component: "worker".to_string(),
            target: "t".to_string(),
            file: None,
            line: None,
            message: Some("boom".to_string()),
            fields: BTreeMap::new(),
            spans: Vec::new(),
        });

        for _ in 0..50 {
            if seen.lock().unwrap().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(*seen.lock().unwrap(), vec!["boom".to_string(), "boom".to_string()]);
    }
}
