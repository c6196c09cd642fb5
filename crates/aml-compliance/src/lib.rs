//! Address compliance decisions.
//!
//! Three independent signals are produced for a request: the active
//! [`ComplianceProvider`]'s verdict on the address, whether the request origin is
//! geo-restricted, and whether the address is allow-listed. Combining them is up
//! to the caller.

pub mod audit_logger;
pub mod client;
pub mod config;
pub mod error;
pub mod geo;
pub mod lists;
pub mod metrics;
pub mod providers;
pub mod screener;
pub mod signer;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use audit_logger::{AuditLogger, ComplianceEvent, EventType};
pub use client::{parse_response, ParsedResponse, RetryPolicy, RiskApiClient};
pub use config::{Config, RiskApiConfig};
pub use error::{ComplianceError, Result, RiskApiError, TransportError};
pub use geo::{AllowListCheck, GeoComplianceReason, GeoOriginHeaders, GeoRestrictionGuard};
pub use lists::{StaticAddressSet, StaticCountrySet};
pub use metrics::{MetricsSink, NoopMetrics, SharedMetrics, TracingMetrics};
pub use providers::{
    BlocklistProvider, ComplianceProvider, HeuristicProvider, ProviderRegistry, RiskScoringProvider,
};
pub use screener::{ComplianceScreener, ComplianceScreenerBuilder, ScreeningSignals};
pub use signer::{sign, AuthHeaders, Signer};
pub use transport::{ReqwestTransport, RiskTransport};
pub use types::{ComplianceResult, ProviderId, NOT_IN_CHAIN, NO_RULES_TRIGGERED};
