//! HTTP transport for the risk API.
//!
//! The client talks to the network only through [`RiskTransport`], which reports
//! non-2xx responses as [`TransportError::Status`] so callers can match on the
//! status code instead of inspecting opaque errors.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::{ComplianceError, Result, TransportError};

#[async_trait]
pub trait RiskTransport: Send + Sync {
    /// POST `body` as JSON to `url`, returning the response body on 2xx.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: String,
    ) -> std::result::Result<String, TransportError>;
}

/// [`RiskTransport`] backed by a `reqwest` client with a fixed request timeout.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ComplianceError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RiskTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: String,
    ) -> std::result::Result<String, TransportError> {
        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        debug!(
            status = %status,
            body_len = response_text.len(),
            "Received response from risk API"
        );

        if status.is_success() {
            Ok(response_text)
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                body: response_text,
            })
        }
    }
}
