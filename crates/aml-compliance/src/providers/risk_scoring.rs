use async_trait::async_trait;
use std::sync::Arc;

use crate::client::RiskApiClient;
use crate::error::Result;
use crate::providers::ComplianceProvider;
use crate::types::{is_sentinel_score, ComplianceResult, ProviderId};

/// Blocks addresses whose upstream risk score meets the threshold.
pub struct RiskScoringProvider {
    client: Arc<RiskApiClient>,
    risk_threshold: i64,
}

impl RiskScoringProvider {
    pub fn new(client: Arc<RiskApiClient>, risk_threshold: i64) -> Self {
        Self {
            client,
            risk_threshold,
        }
    }

    pub fn risk_threshold(&self) -> i64 {
        self.risk_threshold
    }
}

/// Applies the threshold to a raw score.
///
/// Sentinels are negative, so with a non-negative threshold they never block; they
/// are compared like any other score but are not rendered.
pub fn evaluate_score(address: &str, score: i64, risk_threshold: i64) -> ComplianceResult {
    let result = if score >= risk_threshold {
        ComplianceResult::blocked(address)
    } else {
        ComplianceResult::clear(address)
    };

    if is_sentinel_score(score) {
        result
    } else {
        result.with_risk_score(score.to_string())
    }
}

#[async_trait]
impl ComplianceProvider for RiskScoringProvider {
    fn id(&self) -> ProviderId {
        ProviderId::RiskScoring
    }

    async fn get_compliance_response(&self, address: &str) -> Result<ComplianceResult> {
        let score = self.client.get_risk_score(address).await?;
        let result = evaluate_score(address, score, self.risk_threshold);
        if result.blocked {
            tracing::warn!(address, score, threshold = self.risk_threshold, "Risk score meets threshold");
        }
        Ok(result)
    }
}
