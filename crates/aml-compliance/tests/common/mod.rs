#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aml_compliance::{MetricsSink, RiskApiConfig, RiskTransport, TransportError};
use async_trait::async_trait;

// base64("test-secret")
pub const TEST_SECRET: &str = "dGVzdC1zZWNyZXQ=";
pub const TEST_BASE_URL: &str = "https://risk.example.test";

pub fn risk_config(max_retries: u32) -> RiskApiConfig {
    RiskApiConfig {
        base_url: TEST_BASE_URL.to_string(),
        api_key: "test-key".to_string(),
        api_secret: TEST_SECRET.to_string(),
        max_retries,
        ..RiskApiConfig::default()
    }
}

pub fn scored(score: i64) -> Result<String, TransportError> {
    Ok(format!(
        r#"{{"risk_score": {}, "evaluation_detail": {{"source": [], "destination": []}}}}"#,
        score
    ))
}

pub fn status(status: u16, body: &str) -> Result<String, TransportError> {
    Err(TransportError::Status {
        status,
        body: body.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Replays canned responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<String, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<String, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RiskTransport for ScriptedTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: String,
    ) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers.to_vec(),
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".to_string())))
    }
}

#[derive(Default)]
pub struct RecordingMetrics {
    increments: Mutex<Vec<(String, Vec<(String, String)>)>>,
    timings: Mutex<Vec<(String, u64)>>,
}

impl RecordingMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn increments(&self, name: &str) -> Vec<Vec<(String, String)>> {
        self.increments
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, tags)| tags.clone())
            .collect()
    }

    pub fn timing_count(&self, name: &str) -> usize {
        self.timings.lock().unwrap().iter().filter(|(n, _)| n == name).count()
    }
}

impl MetricsSink for RecordingMetrics {
    fn increment(&self, name: &str, tags: &[(&str, &str)]) {
        let tags = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.increments.lock().unwrap().push((name.to_string(), tags));
    }

    fn timing(&self, name: &str, duration_ms: u64) {
        self.timings.lock().unwrap().push((name.to_string(), duration_ms));
    }
}
