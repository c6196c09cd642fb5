use crate::error::{ComplianceError, Result};
use crate::lists::{StaticAddressSet, StaticCountrySet};
use crate::types::ProviderId;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_COMPLIANCE_PROVIDER: &str = "COMPLIANCE_PROVIDER";
pub const ENV_RISK_API_BASE_URL: &str = "RISK_API_BASE_URL";
pub const ENV_RISK_API_KEY: &str = "RISK_API_KEY";
pub const ENV_RISK_API_SECRET: &str = "RISK_API_SECRET";
pub const ENV_RISK_API_MAX_RETRIES: &str = "RISK_API_MAX_RETRIES";
pub const ENV_RISK_API_TIMEOUT_MS: &str = "RISK_API_TIMEOUT_MS";
pub const ENV_RISK_API_RETRY_DELAY_MS: &str = "RISK_API_RETRY_DELAY_MS";
pub const ENV_RISK_SCORE_THRESHOLD: &str = "RISK_SCORE_THRESHOLD";
pub const ENV_BLOCKED_ADDRESSES: &str = "BLOCKED_ADDRESSES";
pub const ENV_RESTRICTED_COUNTRIES: &str = "RESTRICTED_COUNTRIES";
pub const ENV_WHITELISTED_ADDRESSES: &str = "WHITELISTED_ADDRESSES";
pub const ENV_GEOBLOCKING_ENABLED: &str = "GEOBLOCKING_ENABLED";

pub const DEFAULT_RISK_API_BASE_URL: &str = "https://aml-api.elliptic.co";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RISK_THRESHOLD: i64 = 10;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Raw provider identifier; unrecognized values fall back to risk scoring.
    pub provider: String,
    pub risk_api: RiskApiConfig,
    pub lists: ListsConfig,
    pub geoblocking: GeoblockingConfig,
    pub audit_logging: AuditLoggingConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskApiConfig {
    pub base_url: String,
    pub api_key: String,
    /// Base64-encoded HMAC key.
    pub api_secret: String,
    pub max_retries: u32,
    pub risk_threshold: i64,
    pub timeout_ms: u64,
    /// Pause between HTTP 500 retries. Zero keeps retries back-to-back.
    pub retry_delay_ms: u64,
}

impl std::fmt::Debug for RiskApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("max_retries", &self.max_retries)
            .field("risk_threshold", &self.risk_threshold)
            .field("timeout_ms", &self.timeout_ms)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

impl RiskApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Comma-separated static lists, parsed once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListsConfig {
    pub blocked_addresses: String,
    pub restricted_countries: String,
    pub allow_listed_addresses: String,
}

impl ListsConfig {
    pub fn blocked_address_set(&self) -> StaticAddressSet {
        StaticAddressSet::from_csv(&self.blocked_addresses)
    }

    pub fn restricted_country_set(&self) -> StaticCountrySet {
        StaticCountrySet::from_csv(&self.restricted_countries)
    }

    pub fn allow_listed_address_set(&self) -> StaticAddressSet {
        StaticAddressSet::from_csv(&self.allow_listed_addresses)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoblockingConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditLoggingConfig {
    pub enabled: bool,
    pub format: LogFormat,
    pub include_clear_results: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

impl Config {
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ComplianceError::ConfigError(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ComplianceError::TomlError)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the configuration from environment variables, keeping defaults for unset ones.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let risk_defaults = defaults.risk_api;
        let lists = ListsConfig {
            blocked_addresses: env::var(ENV_BLOCKED_ADDRESSES).unwrap_or_default(),
            restricted_countries: env::var(ENV_RESTRICTED_COUNTRIES).unwrap_or_default(),
            allow_listed_addresses: env::var(ENV_WHITELISTED_ADDRESSES).unwrap_or_default(),
        };

        let config = Self {
            provider: env::var(ENV_COMPLIANCE_PROVIDER).unwrap_or(defaults.provider),
            risk_api: RiskApiConfig {
                base_url: env::var(ENV_RISK_API_BASE_URL).unwrap_or(risk_defaults.base_url),
                api_key: env::var(ENV_RISK_API_KEY).unwrap_or_default(),
                api_secret: env::var(ENV_RISK_API_SECRET).unwrap_or_default(),
                max_retries: env_parse(ENV_RISK_API_MAX_RETRIES, risk_defaults.max_retries)?,
                risk_threshold: env_parse(ENV_RISK_SCORE_THRESHOLD, risk_defaults.risk_threshold)?,
                timeout_ms: env_parse(ENV_RISK_API_TIMEOUT_MS, risk_defaults.timeout_ms)?,
                retry_delay_ms: env_parse(ENV_RISK_API_RETRY_DELAY_MS, risk_defaults.retry_delay_ms)?,
            },
            lists,
            geoblocking: GeoblockingConfig {
                enabled: env_bool(ENV_GEOBLOCKING_ENABLED, defaults.geoblocking.enabled)?,
            },
            audit_logging: defaults.audit_logging,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would let a sentinel score block an address.
    pub fn validate(&self) -> Result<()> {
        if self.risk_api.risk_threshold < 0 {
            return Err(ComplianceError::ConfigError(format!(
                "risk_threshold must be non-negative, got {}",
                self.risk_api.risk_threshold
            )));
        }
        Ok(())
    }

    /// `None` when the configured identifier is not one of the known providers.
    pub fn provider_id(&self) -> Option<ProviderId> {
        self.provider.parse().ok()
    }
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| ComplianceError::ConfigError(format!("env {} has invalid value '{}': {}", name, raw, e))),
        _ => Ok(default),
    }
}

fn env_bool(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => parse_bool(&raw).ok_or_else(|| {
            ComplianceError::ConfigError(format!("env {} has invalid boolean '{}'", name, raw))
        }),
        _ => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderId::RiskScoring.to_string(),
            risk_api: RiskApiConfig::default(),
            lists: ListsConfig::default(),
            geoblocking: GeoblockingConfig::default(),
            audit_logging: AuditLoggingConfig::default(),
        }
    }
}

impl Default for RiskApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RISK_API_BASE_URL.to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            max_retries: DEFAULT_MAX_RETRIES,
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_delay_ms: 0,
        }
    }
}

impl Default for GeoblockingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for AuditLoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: LogFormat::Json,
            include_clear_results: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.provider_id(), Some(ProviderId::RiskScoring));
        assert_eq!(config.risk_api.max_retries, 3);
        assert_eq!(config.risk_api.risk_threshold, 10);
        assert_eq!(config.risk_api.timeout(), Duration::from_secs(10));
        assert!(config.risk_api.retry_delay().is_zero());
        assert!(config.geoblocking.enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            provider = "heuristic"

            [risk_api]
            api_key = "key"
            risk_threshold = 25

            [lists]
            restricted_countries = "US,CU"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider_id(), Some(ProviderId::Heuristic));
        assert_eq!(config.risk_api.api_key, "key");
        assert_eq!(config.risk_api.risk_threshold, 25);
        assert_eq!(config.risk_api.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.risk_api.base_url, DEFAULT_RISK_API_BASE_URL);
        assert!(config.lists.restricted_country_set().contains("cu"));
        assert!(config.lists.blocked_address_set().is_empty());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[geoblocking]\nenabled = false\n[audit_logging]\nformat = \"text\"\n")
            .unwrap();
        file.flush().unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert!(!config.geoblocking.enabled);
        assert_eq!(config.audit_logging.format, LogFormat::Text);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ComplianceError::ConfigError(_)));
    }

    #[test]
    fn test_unknown_provider_is_none() {
        let config = Config {
            provider: "SOMETHING_ELSE".to_string(),
            ..Config::default()
        };
        assert_eq!(config.provider_id(), None);
    }

    #[test]
    fn test_secret_is_redacted() {
        let config = RiskApiConfig {
            api_secret: "c2VjcmV0".to_string(),
            ..RiskApiConfig::default()
        };
        assert!(!format!("{:?}", config).contains("c2VjcmV0"));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let err = Config::from_toml("[risk_api]\nrisk_threshold = -1").unwrap_err();
        assert!(matches!(err, ComplianceError::ConfigError(_)));
        assert!(Config::from_toml("[risk_api]\nrisk_threshold = 0").is_ok());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
