//! Deterministic stand-in provider for test and development environments.
//!
//! This is NOT a security control. It exists so non-production deployments get
//! a stable mix of blocked and clear addresses without calling the risk API.

use async_trait::async_trait;

use crate::error::Result;
use crate::providers::ComplianceProvider;
use crate::types::{ComplianceResult, ProviderId};

pub const HEURISTIC_RISK_SCORE: &str = "75";

/// Blocks addresses whose last character lies strictly between `'a'` and `'m'`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicProvider;

impl HeuristicProvider {
    pub fn is_flagged(address: &str) -> bool {
        address.chars().last().is_some_and(|c| c > 'a' && c < 'm')
    }
}

#[async_trait]
impl ComplianceProvider for HeuristicProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Heuristic
    }

    async fn get_compliance_response(&self, address: &str) -> Result<ComplianceResult> {
        if Self::is_flagged(address) {
            Ok(ComplianceResult::blocked(address).with_risk_score(HEURISTIC_RISK_SCORE))
        } else {
            Ok(ComplianceResult::clear(address))
        }
    }
}
