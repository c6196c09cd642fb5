use crate::audit_logger::{AuditLogger, ComplianceEvent, EventType};
use crate::client::RiskApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::geo::{AllowListCheck, GeoComplianceReason, GeoOriginHeaders, GeoRestrictionGuard};
use crate::metrics::{default_metrics, SharedMetrics};
use crate::providers::{BlocklistProvider, ComplianceProvider, HeuristicProvider, ProviderRegistry};
use crate::transport::RiskTransport;
use crate::types::{ComplianceResult, ProviderId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The three independent compliance signals for one request.
///
/// They are reported side by side; turning them into an allow/deny decision
/// (for example letting allow-listed addresses bypass geo restriction) is left to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningSignals {
    pub compliance: ComplianceResult,
    pub geo_restricted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_reason: Option<GeoComplianceReason>,
    pub allow_listed: bool,
}

pub struct ComplianceScreener {
    provider: Arc<dyn ComplianceProvider>,
    geo_guard: GeoRestrictionGuard,
    allow_list: AllowListCheck,
    audit_logger: Arc<AuditLogger>,
}

impl ComplianceScreener {
    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    pub fn provider(&self) -> Arc<dyn ComplianceProvider> {
        self.provider.clone()
    }

    pub fn geo_guard(&self) -> &GeoRestrictionGuard {
        &self.geo_guard
    }

    pub fn allow_list(&self) -> &AllowListCheck {
        &self.allow_list
    }

    /// Provider result for `address` alone.
    pub async fn screen_address(&self, address: &str) -> Result<ComplianceResult> {
        self.provider.get_compliance_response(address).await
    }

    pub fn is_restricted_origin(&self, headers: &GeoOriginHeaders) -> bool {
        self.geo_guard.is_restricted(headers)
    }

    pub fn is_allow_listed(&self, address: &str) -> bool {
        self.allow_list.is_allow_listed(address)
    }

    /// Collects all three signals for `address` and the request origin.
    pub async fn screen(&self, address: &str, headers: &GeoOriginHeaders) -> Result<ScreeningSignals> {
        let geo_restricted = self.geo_guard.is_restricted(headers);
        let geo_reason = self.geo_guard.geo_compliance_reason(headers);
        let allow_listed = self.allow_list.is_allow_listed(address);

        let compliance = match self.provider.get_compliance_response(address).await {
            Ok(compliance) => compliance,
            Err(e) => {
                self.audit(address, None, geo_restricted, headers, allow_listed, Some(e.to_string()));
                return Err(e);
            }
        };

        self.audit(address, Some(&compliance), geo_restricted, headers, allow_listed, None);

        Ok(ScreeningSignals {
            compliance,
            geo_restricted,
            geo_reason,
            allow_listed,
        })
    }

    fn audit(
        &self,
        address: &str,
        compliance: Option<&ComplianceResult>,
        geo_restricted: bool,
        headers: &GeoOriginHeaders,
        allow_listed: bool,
        error: Option<String>,
    ) {
        let blocked = compliance.is_some_and(|c| c.blocked);
        self.audit_logger.log_event(ComplianceEvent {
            timestamp: chrono::Utc::now(),
            event_type: EventType::classify(error.is_some(), blocked, geo_restricted),
            address: address.to_string(),
            provider: self.provider.id(),
            blocked,
            risk_score: compliance.and_then(|c| c.risk_score.clone()),
            geo_restricted,
            country: headers.country.clone(),
            allow_listed,
            error,
        });
    }
}

/// Builder wiring config, metrics, transport and audit logging into a [`ComplianceScreener`].
pub struct ComplianceScreenerBuilder {
    config: Option<Config>,
    config_path: Option<std::path::PathBuf>,
    metrics: Option<SharedMetrics>,
    transport: Option<Arc<dyn RiskTransport>>,
    audit_logger: Option<Arc<AuditLogger>>,
}

impl ComplianceScreenerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            config_path: None,
            metrics: None,
            transport: None,
            audit_logger: None,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_config_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Replaces the default `reqwest` transport of the risk API client.
    pub fn with_transport(mut self, transport: Arc<dyn RiskTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_audit_logger(mut self, logger: Arc<AuditLogger>) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    pub fn build(self) -> Result<ComplianceScreener> {
        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => Config::from_file(path)?,
            (None, None) => Config::default(),
        };
        config.validate()?;
        let metrics = self.metrics.unwrap_or_else(default_metrics);

        let blocked = Arc::new(config.lists.blocked_address_set());
        let restricted = Arc::new(config.lists.restricted_country_set());
        let allow_listed = Arc::new(config.lists.allow_listed_address_set());

        // Only risk scoring, including the fallback for unknown ids, needs the API client and its secret.
        let provider: Arc<dyn ComplianceProvider> = match config.provider_id() {
            Some(ProviderId::Blocklist) => Arc::new(BlocklistProvider::new(blocked.clone())),
            Some(ProviderId::Heuristic) => Arc::new(HeuristicProvider),
            id => {
                if config.risk_api.api_key.trim().is_empty() || config.risk_api.api_secret.trim().is_empty() {
                    tracing::warn!("Risk API key or secret is empty; the risk API will reject every request");
                }
                let client = match self.transport {
                    Some(transport) => RiskApiClient::with_transport(&config.risk_api, transport, metrics.clone())?,
                    None => RiskApiClient::new(&config.risk_api, metrics.clone())?,
                };
                ProviderRegistry::new(blocked.clone(), Arc::new(client), config.risk_api.risk_threshold).select(id)
            }
        };

        tracing::info!(
            provider = %provider.id(),
            blocked_addresses = blocked.len(),
            restricted_countries = restricted.len(),
            allow_listed_addresses = allow_listed.len(),
            geoblocking_enabled = config.geoblocking.enabled,
            "Compliance screener initialized"
        );

        let audit_logger = self
            .audit_logger
            .unwrap_or_else(|| Arc::new(AuditLogger::new(config.audit_logging.clone())));

        Ok(ComplianceScreener {
            provider,
            geo_guard: GeoRestrictionGuard::new(config.geoblocking.enabled, restricted, metrics),
            allow_list: AllowListCheck::new(allow_listed),
            audit_logger,
        })
    }
}

impl Default for ComplianceScreenerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
