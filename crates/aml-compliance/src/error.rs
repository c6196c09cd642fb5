use thiserror::Error;

/// Failure of the outbound HTTP call itself, as reported by a [`RiskTransport`].
///
/// [`RiskTransport`]: crate::transport::RiskTransport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("risk API responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("risk API request failed: {0}")]
    Network(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Network(_) => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => TransportError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => TransportError::Network(err.to_string()),
        }
    }
}

/// Errors surfaced by [`RiskApiClient::get_risk_score`].
///
/// The two sentinel outcomes (no rules triggered, not in chain) are successes
/// and never appear here.
///
/// [`RiskApiClient::get_risk_score`]: crate::client::RiskApiClient::get_risk_score
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RiskApiError {
    #[error("malformed response from risk API")]
    MalformedResponse,

    #[error("rate limited by risk API")]
    RateLimited,

    #[error("failed to encode risk API request: {0}")]
    Encode(String),

    /// Exhausted HTTP 500 retries or any other transport failure, unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API secret is not valid base64: {0}")]
    InvalidSecret(#[from] base64::DecodeError),

    #[error(transparent)]
    RiskApi(#[from] RiskApiError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ComplianceError>;
