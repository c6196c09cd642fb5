//! OpenTelemetry-backed metrics for the screening engine.
//!
//! Counters and histograms are created lazily the first time a metric name is
//! seen and exported to stdout by a periodic reader.

use aml_compliance::MetricsSink;
use dashmap::DashMap;
use opentelemetry::metrics::{Counter, Histogram, Meter, MeterProvider};
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::SdkMeterProvider;

pub struct Telemetry {
    name: &'static str,
    provider: SdkMeterProvider,
}

impl Telemetry {
    pub fn new(name: &'static str) -> Self {
        let provider = SdkMeterProvider::builder()
            .with_periodic_exporter(opentelemetry_stdout::MetricExporter::default())
            .build();
        Self { name, provider }
    }

    pub fn metrics(&self) -> OtelMetrics {
        OtelMetrics::new(self.provider.meter(self.name))
    }

    /// Flushes pending metrics. Errors are logged, not returned.
    pub fn shutdown(self) {
        if let Err(e) = self.provider.shutdown() {
            tracing::warn!("Failed to shut down meter provider: {}", e);
        }
    }
}

pub struct OtelMetrics {
    meter: Meter,
    counters: DashMap<String, Counter<u64>>,
    histograms: DashMap<String, Histogram<f64>>,
}

impl OtelMetrics {
    pub fn new(meter: Meter) -> Self {
        Self {
            meter,
            counters: DashMap::new(),
            histograms: DashMap::new(),
        }
    }
}

impl MetricsSink for OtelMetrics {
    fn increment(&self, name: &str, tags: &[(&str, &str)]) {
        let attributes: Vec<KeyValue> = tags
            .iter()
            .map(|(k, v)| KeyValue::new(k.to_string(), v.to_string()))
            .collect();
        self.counters
            .entry(name.to_string())
            .or_insert_with(|| self.meter.u64_counter(name.to_string()).build())
            .add(1, &attributes);
    }

    fn timing(&self, name: &str, duration_ms: u64) {
        self.histograms
            .entry(name.to_string())
            .or_insert_with(|| {
                self.meter
                    .f64_histogram(name.to_string())
                    .with_unit("ms")
                    .build()
            })
            .record(duration_ms as f64, &[]);
    }
}
