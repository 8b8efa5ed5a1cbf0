//! Sources for components that cannot be measured yet.
//!
//! They always succeed with an all-zero record, so the component contributes
//! nothing and the remaining components are still scored.

use fico_core::types::{ActivityHistory, ProfitabilityResult, StabilityResult, TxSuccessResult};
use fico_core::Result;
use tracing::debug;

use crate::source::{ActivitySource, ProfitabilitySource, StabilitySource, TxSuccessSource};

pub const TX_SUCCESS_NO_DATA_REASON: &str = "No transaction history available for this agent";
pub const X402_NO_DATA_REASON: &str = "x402 protocol not yet finalized - no real data available";
pub const ERC8004_NO_DATA_REASON: &str = "ERC-8004 registry not available - agent not registered";

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDataTxSuccessSource;

#[async_trait::async_trait]
impl TxSuccessSource for NoDataTxSuccessSource {
    async fn get_success_score(&self, address: &str, days: u32) -> Result<TxSuccessResult> {
        debug!(address = %address, "No tx success data");
        Ok(TxSuccessResult::no_data(address, days, TX_SUCCESS_NO_DATA_REASON))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDataProfitabilitySource;

#[async_trait::async_trait]
impl ProfitabilitySource for NoDataProfitabilitySource {
    async fn get_profitability(&self, address: &str, days: u32) -> Result<ProfitabilityResult> {
        debug!(address = %address, "No x402 profitability data");
        Ok(ProfitabilityResult::no_data(address, days, X402_NO_DATA_REASON))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDataStabilitySource;

#[async_trait::async_trait]
impl StabilitySource for NoDataStabilitySource {
    async fn get_stability(&self, address: &str) -> Result<StabilityResult> {
        debug!(address = %address, "No ERC-8004 registry data");
        Ok(StabilityResult::no_data(address, ERC8004_NO_DATA_REASON))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDataActivitySource;

#[async_trait::async_trait]
impl ActivitySource for NoDataActivitySource {
    async fn get_activity(&self, _address: &str, _days: u32) -> Result<ActivityHistory> {
        Ok(ActivityHistory::default())
    }
}
