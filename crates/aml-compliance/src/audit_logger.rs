use crate::config::{AuditLoggingConfig, LogFormat};
use crate::types::ProviderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    pub address: String,
    pub provider: ProviderId,
    pub blocked: bool,
    pub risk_score: Option<String>,
    pub geo_restricted: bool,
    pub country: Option<String>,
    pub allow_listed: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    ProviderBlock,
    GeoRestricted,
    Clear,
    ScreeningError,
}

impl EventType {
    /// Most severe signal wins: errors, then provider blocks, then geo restriction.
    pub fn classify(error: bool, blocked: bool, geo_restricted: bool) -> Self {
        if error {
            EventType::ScreeningError
        } else if blocked {
            EventType::ProviderBlock
        } else if geo_restricted {
            EventType::GeoRestricted
        } else {
            EventType::Clear
        }
    }
}

pub struct AuditLogger {
    config: AuditLoggingConfig,
}

impl AuditLogger {
    pub fn new(config: AuditLoggingConfig) -> Self {
        Self { config }
    }

    /// Whether `event` passes the configured filters.
    pub fn should_log(&self, event: &ComplianceEvent) -> bool {
        self.config.enabled
            && (event.event_type != EventType::Clear || self.config.include_clear_results)
    }

    pub fn log_event(&self, event: ComplianceEvent) {
        if !self.should_log(&event) {
            return;
        }

        let message = match self.config.format {
            LogFormat::Json => serde_json::to_string(&event)
                .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize: {}"}}"#, e)),
            LogFormat::Text => Self::format_text(&event),
        };

        // tracing targets must be compile-time constants
        match event.event_type {
            EventType::ProviderBlock | EventType::ScreeningError => {
                tracing::error!(target: "compliance_audit", "{}", message)
            }
            EventType::GeoRestricted => {
                tracing::warn!(target: "compliance_audit", "{}", message)
            }
            EventType::Clear => {
                tracing::info!(target: "compliance_audit", "{}", message)
            }
        }
    }

    fn format_text(event: &ComplianceEvent) -> String {
        format!(
            "[{}] {:?} - address: {} | Provider: {} | Blocked: {} | Score: {} | Geo restricted: {} ({}) | Allow-listed: {}{}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.event_type,
            event.address,
            event.provider,
            event.blocked,
            event.risk_score.as_deref().unwrap_or("-"),
            event.geo_restricted,
            event.country.as_deref().unwrap_or("undefined"),
            event.allow_listed,
            event
                .error
                .as_deref()
                .map(|e| format!(" | Error: {}", e))
                .unwrap_or_default()
        )
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(AuditLoggingConfig::default())
    }
}
