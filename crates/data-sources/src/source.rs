//! Source interfaces consumed by the score engine.
//!
//! A source that has nothing to measure returns its `no_data` record, which
//! scores 0. `Err` is reserved for upstream failures such as network or API
//! errors.

use fico_core::types::{ActivityHistory, ProfitabilityResult, StabilityResult, TxSuccessResult};
use fico_core::Result;

/// Transaction success rate over a trailing window.
#[async_trait::async_trait]
pub trait TxSuccessSource: Send + Sync {
    async fn get_success_score(&self, address: &str, days: u32) -> Result<TxSuccessResult>;
}

/// x402 payment profitability over a trailing window.
#[async_trait::async_trait]
pub trait ProfitabilitySource: Send + Sync {
    async fn get_profitability(&self, address: &str, days: u32) -> Result<ProfitabilityResult>;
}

/// ERC-8004 registry stability.
#[async_trait::async_trait]
pub trait StabilitySource: Send + Sync {
    async fn get_stability(&self, address: &str) -> Result<StabilityResult>;
}

/// Raw activity for the anti-gaming chain.
#[async_trait::async_trait]
pub trait ActivitySource: Send + Sync {
    async fn get_activity(&self, address: &str, days: u32) -> Result<ActivityHistory>;
}
