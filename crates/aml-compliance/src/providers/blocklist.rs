use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::lists::StaticAddressSet;
use crate::providers::ComplianceProvider;
use crate::types::{ComplianceResult, ProviderId};

/// Blocks exactly the addresses in the configured static set. Never reports a score.
#[derive(Debug, Clone)]
pub struct BlocklistProvider {
    blocked: Arc<StaticAddressSet>,
}

impl BlocklistProvider {
    pub fn new(blocked: Arc<StaticAddressSet>) -> Self {
        Self { blocked }
    }
}

#[async_trait]
impl ComplianceProvider for BlocklistProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Blocklist
    }

    async fn get_compliance_response(&self, address: &str) -> Result<ComplianceResult> {
        if self.blocked.contains(address) {
            tracing::warn!(address, "Address is on the static blocklist");
            Ok(ComplianceResult::blocked(address))
        } else {
            Ok(ComplianceResult::clear(address))
        }
    }
}
