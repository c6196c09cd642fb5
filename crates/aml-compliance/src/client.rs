//! Client for the synchronous wallet-exposure endpoint of the AML risk API.
//!
//! Every attempt is signed afresh with the current timestamp. Outcomes:
//! - 2xx with a valid body: the score, or [`NO_RULES_TRIGGERED`] when `risk_score` is null
//! - 404 `NotInBlockchain`: [`NOT_IN_CHAIN`]
//! - 429: [`RiskApiError::RateLimited`], never retried
//! - 500: retried up to `max_retries` more times, then the transport error as-is
//! - anything else: the transport error as-is

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::RiskApiConfig;
use crate::error::{Result, RiskApiError, TransportError};
use crate::metrics::{SharedMetrics, METRIC_RISK_API_MALFORMED, METRIC_RISK_API_TIMING};
use crate::signer::Signer;
use crate::transport::{ReqwestTransport, RiskTransport};
use crate::types::{NOT_IN_CHAIN, NO_RULES_TRIGGERED};

pub const RISK_API_PATH: &str = "/v2/wallet/synchronous";
pub const HOLISTIC: &str = "holistic";

const NOT_IN_BLOCKCHAIN_ERROR: &str = "NotInBlockchain";

/// Request body for a wallet exposure check across every chain and asset.
#[derive(Debug, Clone, Serialize)]
pub struct WalletExposureRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub customer_reference: &'static str,
    pub subject: Subject<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Subject<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub hash: &'a str,
    pub asset: &'static str,
    pub blockchain: &'static str,
}

impl<'a> WalletExposureRequest<'a> {
    pub fn holistic(address: &'a str) -> Self {
        Self {
            kind: "wallet_exposure",
            customer_reference: "string",
            subject: Subject {
                kind: "address",
                hash: address,
                asset: HOLISTIC,
                blockchain: HOLISTIC,
            },
        }
    }
}

/// Normalized view of a 2xx response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedResponse {
    pub success: bool,
    pub risk_score: Option<i64>,
}

impl ParsedResponse {
    const MALFORMED: Self = Self {
        success: false,
        risk_score: None,
    };
}

/// Validates a response body. Only `risk_score` and the presence of
/// `evaluation_detail.source` / `evaluation_detail.destination` are consulted.
pub fn parse_response(body: &str) -> ParsedResponse {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return ParsedResponse::MALFORMED;
    };

    let score = match value.get("risk_score") {
        Some(Value::Null) => {
            return ParsedResponse {
                success: true,
                risk_score: None,
            }
        }
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        _ => None,
    };
    let Some(score) = score else {
        return ParsedResponse::MALFORMED;
    };

    let present = |pointer: &str| value.pointer(pointer).is_some_and(|v| !v.is_null());
    if !present("/evaluation_detail/source") && !present("/evaluation_detail/destination") {
        return ParsedResponse::MALFORMED;
    }

    ParsedResponse {
        success: true,
        risk_score: Some(score),
    }
}

fn is_not_in_chain(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("name").and_then(Value::as_str).map(|name| name == NOT_IN_BLOCKCHAIN_ERROR))
        .unwrap_or(false)
}

/// Bounded retry on HTTP 500. `delay` defaults to zero: retries go out back-to-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            delay: Duration::ZERO,
        }
    }
}

pub struct RiskApiClient {
    transport: Arc<dyn RiskTransport>,
    signer: Signer,
    api_key: String,
    url: String,
    retry: RetryPolicy,
    metrics: SharedMetrics,
}

impl RiskApiClient {
    /// Client over HTTP using `reqwest` with the configured timeout.
    pub fn new(config: &RiskApiConfig, metrics: SharedMetrics) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Self::with_transport(config, Arc::new(transport), metrics)
    }

    pub fn with_transport(
        config: &RiskApiConfig,
        transport: Arc<dyn RiskTransport>,
        metrics: SharedMetrics,
    ) -> Result<Self> {
        let signer = Signer::new(&config.api_secret)?;
        let url = format!("{}{}", config.base_url.trim_end_matches('/'), RISK_API_PATH);

        info!(url = %url, max_retries = config.max_retries, "Risk API client initialized");

        Ok(Self {
            transport,
            signer,
            api_key: config.api_key.clone(),
            url,
            retry: RetryPolicy {
                max_retries: config.max_retries,
                delay: config.retry_delay(),
            },
            metrics,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Fetches the risk score for `address`, which may be one of the sentinels.
    pub async fn get_risk_score(&self, address: &str) -> std::result::Result<i64, RiskApiError> {
        let payload = serde_json::to_string(&WalletExposureRequest::holistic(address))
            .map_err(|e| RiskApiError::Encode(e.to_string()))?;

        let mut attempt: u32 = 0;
        loop {
            let timestamp_ms = Utc::now().timestamp_millis();
            let headers = self
                .signer
                .auth_headers(&self.api_key, timestamp_ms, "POST", RISK_API_PATH, &payload);

            let started = Instant::now();
            let result = self
                .transport
                .post_json(&self.url, &headers.to_pairs(), payload.clone())
                .await;
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            self.metrics.timing(METRIC_RISK_API_TIMING, elapsed_ms);

            let err = match result {
                Ok(body) => return self.score_from_body(address, &body),
                Err(err) => err,
            };

            match err {
                TransportError::Status { status: 404, ref body } if is_not_in_chain(body) => {
                    debug!(address, "Address not found on any chain");
                    return Ok(NOT_IN_CHAIN);
                }
                TransportError::Status { status: 429, .. } => {
                    warn!(address, attempt, "Risk API rate limited request");
                    return Err(RiskApiError::RateLimited);
                }
                TransportError::Status { status: 500, .. } if attempt < self.retry.max_retries => {
                    attempt += 1;
                    warn!(
                        address,
                        attempt,
                        max_retries = self.retry.max_retries,
                        "Risk API returned HTTP 500, retrying"
                    );
                    if !self.retry.delay.is_zero() {
                        tokio::time::sleep(self.retry.delay).await;
                    }
                }
                other => {
                    error!(address, attempt, error = %other, "Risk API request failed");
                    return Err(other.into());
                }
            }
        }
    }

    fn score_from_body(&self, address: &str, body: &str) -> std::result::Result<i64, RiskApiError> {
        let parsed = parse_response(body);
        if !parsed.success {
            self.metrics.increment(METRIC_RISK_API_MALFORMED, &[]);
            error!(address, body_len = body.len(), "Malformed response from risk API");
            return Err(RiskApiError::MalformedResponse);
        }
        Ok(parsed.risk_score.unwrap_or(NO_RULES_TRIGGERED))
    }
}
