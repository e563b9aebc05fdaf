use std::collections::BTreeMap;

use tracing::info;

/// One emitted metrics event (spec §6): a named occurrence scoped to a
/// campaign and pipeline stage, with an optional duration and free-form
/// metadata. The pipeline driver emits one of these at each stage
/// transition and external-call boundary.
#[derive(Debug, Clone)]
pub struct MetricsEvent {
    pub event_name: String,
    pub stage: String,
    pub campaign_id: String,
    pub duration_ms: Option<u64>,
    pub metadata: BTreeMap<String, String>,
}

impl MetricsEvent {
    pub fn new(event_name: impl Into<String>, stage: impl Into<String>, campaign_id: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            stage: stage.into(),
            campaign_id: campaign_id.into(),
            duration_ms: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Sink a [`MetricsEvent`] is published to. The only implementation in
/// this crate logs structured fields via `tracing`; a real deployment can
/// swap in a StatsD/OTLP sink behind the same trait without touching
/// orchestration code.
pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

/// Default sink: emits the event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn record(&self, event: MetricsEvent) {
        info!(
            event = %event.event_name,
            stage = %event.stage,
            campaign_id = %event.campaign_id,
            duration_ms = event.duration_ms,
            metadata = ?event.metadata,
            "metrics event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_duration_and_metadata() {
        let event = MetricsEvent::new("search.keyword_fetched", "search", "c1")
            .with_duration_ms(120)
            .with_metadata("provider", "listennotes");
        assert_eq!(event.duration_ms, Some(120));
        assert_eq!(event.metadata.get("provider").map(String::as_str), Some("listennotes"));
    }

    #[test]
    fn tracing_sink_does_not_panic() {
        let sink = TracingMetricsSink;
        sink.record(MetricsEvent::new("x", "search", "c1"));
    }
}
