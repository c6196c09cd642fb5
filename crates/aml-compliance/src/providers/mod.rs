pub mod blocklist;
pub mod heuristic;
pub mod risk_scoring;

use async_trait::async_trait;
use std::sync::Arc;

use crate::client::RiskApiClient;
use crate::error::Result;
use crate::lists::StaticAddressSet;
use crate::types::{ComplianceResult, ProviderId};

pub use blocklist::BlocklistProvider;
pub use heuristic::HeuristicProvider;
pub use risk_scoring::RiskScoringProvider;

/// Decides whether a single address must be blocked.
#[async_trait]
pub trait ComplianceProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Only the risk scoring provider can fail, when the upstream API does.
    async fn get_compliance_response(&self, address: &str) -> Result<ComplianceResult>;
}

/// The three provider variants, built once at startup.
#[derive(Clone)]
pub struct ProviderRegistry {
    blocklist: Arc<BlocklistProvider>,
    heuristic: Arc<HeuristicProvider>,
    risk_scoring: Arc<RiskScoringProvider>,
}

impl ProviderRegistry {
    pub fn new(blocked: Arc<StaticAddressSet>, client: Arc<RiskApiClient>, risk_threshold: i64) -> Self {
        Self {
            blocklist: Arc::new(BlocklistProvider::new(blocked)),
            heuristic: Arc::new(HeuristicProvider),
            risk_scoring: Arc::new(RiskScoringProvider::new(client, risk_threshold)),
        }
    }

    /// Returns the provider for `id`. Unrecognized identifiers (`None`) get risk scoring.
    pub fn select(&self, id: Option<ProviderId>) -> Arc<dyn ComplianceProvider> {
        match id {
            Some(ProviderId::Blocklist) => self.blocklist.clone(),
            Some(ProviderId::Heuristic) => self.heuristic.clone(),
            Some(ProviderId::RiskScoring) => self.risk_scoring.clone(),
            None => {
                tracing::warn!("Unrecognized compliance provider, falling back to {}", ProviderId::RiskScoring);
                self.risk_scoring.clone()
            }
        }
    }

    /// Like [`select`](Self::select), parsing the identifier from its config string.
    pub fn select_by_name(&self, name: &str) -> Arc<dyn ComplianceProvider> {
        self.select(name.parse().ok())
    }
}
