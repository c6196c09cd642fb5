use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Score reported when the provider evaluated the address and no rule fired.
pub const NO_RULES_TRIGGERED: i64 = -1;
/// Score reported when the provider has never seen the address on-chain.
pub const NOT_IN_CHAIN: i64 = -2;

/// True for the reserved out-of-band scores, which are never displayed.
pub fn is_sentinel_score(score: i64) -> bool {
    score == NO_RULES_TRIGGERED || score == NOT_IN_CHAIN
}

/// Outcome of a provider check for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    pub blocked: bool,
    /// Integer score rendered as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<String>,
}

impl ComplianceResult {
    pub fn clear(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            chain: None,
            blocked: false,
            risk_score: None,
        }
    }

    pub fn blocked(address: impl Into<String>) -> Self {
        Self {
            blocked: true,
            ..Self::clear(address)
        }
    }

    pub fn with_risk_score(mut self, risk_score: impl Into<String>) -> Self {
        self.risk_score = Some(risk_score.into());
        self
    }

    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }
}

/// Which compliance provider the process runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderId {
    Blocklist,
    Heuristic,
    RiskScoring,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Blocklist => "BLOCKLIST",
            ProviderId::Heuristic => "HEURISTIC",
            ProviderId::RiskScoring => "RISK_SCORING",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown compliance provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BLOCKLIST" => Ok(ProviderId::Blocklist),
            "HEURISTIC" => Ok(ProviderId::Heuristic),
            "RISK_SCORING" => Ok(ProviderId::RiskScoring),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}
