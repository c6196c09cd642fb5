//! Metrics seam used by the risk client and the geo guard.

use std::sync::Arc;

pub const METRIC_RISK_API_TIMING: &str = "risk_api.request.timing";
pub const METRIC_RISK_API_MALFORMED: &str = "risk_api.malformed_response";
pub const METRIC_GEO_RESTRICTED: &str = "geo.restricted_request";

/// Sink for counters and timings. Implementations must be cheap and must not fail.
pub trait MetricsSink: Send + Sync {
    fn increment(&self, name: &str, tags: &[(&str, &str)]);

    fn timing(&self, name: &str, duration_ms: u64);
}

pub type SharedMetrics = Arc<dyn MetricsSink>;

/// Emits every metric as a `tracing` debug event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    fn increment(&self, name: &str, tags: &[(&str, &str)]) {
        tracing::debug!(target: "compliance_metrics", metric = name, ?tags, "increment");
    }

    fn timing(&self, name: &str, duration_ms: u64) {
        tracing::debug!(target: "compliance_metrics", metric = name, duration_ms, "timing");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment(&self, _name: &str, _tags: &[(&str, &str)]) {}

    fn timing(&self, _name: &str, _duration_ms: u64) {}
}

pub fn default_metrics() -> SharedMetrics {
    Arc::new(TracingMetrics)
}
