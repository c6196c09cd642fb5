//! HMAC request signing for the risk API.
//!
//! The signed message is `timestamp_ms ++ UPPER(method) ++ lower(path) ++ payload`
//! with no separators, HMAC-SHA256 keyed with the base64-decoded API secret, and
//! the digest base64-encoded. The upstream rejects every request whose signature
//! deviates from this layout.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{ComplianceError, Result};

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_ACCESS_KEY: &str = "x-access-key";
pub const HEADER_ACCESS_SIGN: &str = "x-access-sign";
pub const HEADER_ACCESS_TIMESTAMP: &str = "x-access-timestamp";

/// Signs a single request, decoding `secret_base64` on every call.
pub fn sign(
    timestamp_ms: i64,
    http_method: &str,
    path: &str,
    json_payload: &str,
    secret_base64: &str,
) -> Result<String> {
    Ok(Signer::new(secret_base64)?.sign(timestamp_ms, http_method, path, json_payload))
}

/// Authentication headers attached to each risk API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub access_key: String,
    pub access_sign: String,
    pub access_timestamp: String,
}

impl AuthHeaders {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (HEADER_ACCESS_KEY, self.access_key.clone()),
            (HEADER_ACCESS_SIGN, self.access_sign.clone()),
            (HEADER_ACCESS_TIMESTAMP, self.access_timestamp.clone()),
        ]
    }
}

/// Request signer keyed with the decoded API secret.
#[derive(Clone)]
pub struct Signer {
    mac: HmacSha256,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").field("key", &"<redacted>").finish()
    }
}

impl Signer {
    pub fn new(secret_base64: &str) -> Result<Self> {
        let key = BASE64.decode(secret_base64.trim())?;
        let mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| ComplianceError::ConfigError(format!("Invalid HMAC key: {}", e)))?;
        Ok(Self { mac })
    }

    pub fn sign(&self, timestamp_ms: i64, http_method: &str, path: &str, json_payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(timestamp_ms.to_string().as_bytes());
        mac.update(http_method.to_uppercase().as_bytes());
        mac.update(path.to_lowercase().as_bytes());
        mac.update(json_payload.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }

    pub fn auth_headers(
        &self,
        api_key: &str,
        timestamp_ms: i64,
        http_method: &str,
        path: &str,
        json_payload: &str,
    ) -> AuthHeaders {
        AuthHeaders {
            access_key: api_key.to_string(),
            access_sign: self.sign(timestamp_ms, http_method, path, json_payload),
            access_timestamp: timestamp_ms.to_string(),
        }
    }
}
