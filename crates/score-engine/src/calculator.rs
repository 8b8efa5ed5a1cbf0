//! Score calculator: fetch, aggregate, adjust, classify.

use anti_gaming::{AdjustmentChain, AdjustmentTrail, NoopChain};
use chrono::{DateTime, Utc};
use data_sources::{
    ActivitySource, MockActivitySource, MockProfitabilitySource, MockStabilitySource,
    MockTxSuccessSource, NoDataActivitySource, NoDataProfitabilitySource, NoDataStabilitySource,
    NoDataTxSuccessSource, ProfitabilitySource, StabilitySource, TxSuccessSource,
};
use fico_core::types::{
    ActivityHistory, ProfitabilityResult, RiskTier, StabilityResult, TxSuccessResult,
};
use fico_core::config::clamp_analysis_days;
use fico_core::WeightSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::aggregate::{calculate_from_subscores, estimate_confidence, risk_tier, MAX_OVERALL};
use crate::record::{ScoreBreakdown, ScoreRecord, SourceBreakdown};

/// The three score component sources.
#[derive(Clone)]
pub struct ScoreSources {
    pub tx_success: Arc<dyn TxSuccessSource>,
    pub x402: Arc<dyn ProfitabilitySource>,
    pub erc8004: Arc<dyn StabilitySource>,
}

impl ScoreSources {
    pub fn new(
        tx_success: Arc<dyn TxSuccessSource>,
        x402: Arc<dyn ProfitabilitySource>,
        erc8004: Arc<dyn StabilitySource>,
    ) -> Self {
        Self {
            tx_success,
            x402,
            erc8004,
        }
    }

    /// Every component unmeasurable.
    pub fn no_data() -> Self {
        Self::new(
            Arc::new(NoDataTxSuccessSource),
            Arc::new(NoDataProfitabilitySource),
            Arc::new(NoDataStabilitySource),
        )
    }

    /// Deterministic mock data.
    pub fn mock(seed: u64) -> Self {
        Self::new(
            Arc::new(MockTxSuccessSource::new(seed)),
            Arc::new(MockProfitabilitySource::new(seed)),
            Arc::new(MockStabilitySource::new(seed)),
        )
    }
}

/// AgentFICO score calculator.
///
/// Combines the three sub-scores with validated weights, then runs the
/// adjustment chain on the result. Adjustment failures never fail the
/// calculation: the unadjusted score is returned with the error recorded.
pub struct ScoreCalculator {
    sources: ScoreSources,
    activity: Arc<dyn ActivitySource>,
    chain: Arc<dyn AdjustmentChain>,
    weights: WeightSet,
}

impl ScoreCalculator {
    /// Calculator without anti-gaming adjustments.
    pub fn new(sources: ScoreSources, weights: WeightSet) -> Self {
        Self {
            sources,
            activity: Arc::new(NoDataActivitySource),
            chain: Arc::new(NoopChain),
            weights,
        }
    }

    /// Enable adjustments, reading activity from `activity`.
    pub fn with_adjustments(
        mut self,
        chain: Arc<dyn AdjustmentChain>,
        activity: Arc<dyn ActivitySource>,
    ) -> Self {
        self.chain = chain;
        self.activity = activity;
        self
    }

    /// Mock activity for the adjustment chain, matching [`ScoreSources::mock`].
    pub fn with_mock_activity(mut self, seed: u64) -> Self {
        self.activity = Arc::new(MockActivitySource::new(seed));
        self
    }

    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    /// Weighted overall score from sub-scores, without I/O or adjustments.
    pub fn calculate_from_subscores(&self, tx_success: u32, x402: u32, erc8004: u32) -> u32 {
        calculate_from_subscores(&self.weights, tx_success, x402, erc8004)
    }

    pub fn risk_tier_for(&self, overall: u32) -> RiskTier {
        risk_tier(overall)
    }

    /// Score `address` over the last `days` days.
    pub async fn calculate_score(&self, address: &str, days: u32) -> ScoreRecord {
        self.calculate_score_at(address, days, Utc::now()).await
    }

    /// Score with an explicit reference time for the adjustment chain.
    pub async fn calculate_score_at(
        &self,
        address: &str,
        days: u32,
        reference: DateTime<Utc>,
    ) -> ScoreRecord {
        let days = clamp_analysis_days(days);
        let (tx_result, x402_result, erc_result, activity) = tokio::join!(
            self.sources.tx_success.get_success_score(address, days),
            self.sources.x402.get_profitability(address, days),
            self.sources.erc8004.get_stability(address),
            self.activity.get_activity(address, days),
        );

        let tx_result = tx_result.unwrap_or_else(|e| {
            warn!(address = %address, error = %e, "Tx success source failed, scoring as no data");
            TxSuccessResult::no_data(address, days, e.to_string())
        });
        let x402_result = x402_result.unwrap_or_else(|e| {
            warn!(address = %address, error = %e, "x402 source failed, scoring as no data");
            ProfitabilityResult::no_data(address, days, e.to_string())
        });
        let erc_result = erc_result.unwrap_or_else(|e| {
            warn!(address = %address, error = %e, "ERC-8004 source failed, scoring as no data");
            StabilityResult::no_data(address, e.to_string())
        });

        let tx_score = tx_result.score.min(100);
        let x402_score = x402_result.score.min(100);
        let erc_score = erc_result.score.min(100);
        let base_score = self.calculate_from_subscores(tx_score, x402_score, erc_score);

        let trail = match activity {
            Ok(activity) => self.adjust(address, base_score, activity, reference).await,
            Err(e) => {
                warn!(
                    address = %address,
                    error = %e,
                    "Activity source failed, using base score"
                );
                AdjustmentTrail::failed(base_score, e.to_string())
            }
        };

        let overall = trail.adjusted_score.min(MAX_OVERALL);
        let tier = risk_tier(overall);
        let confidence = estimate_confidence(tx_result.total_txs, erc_result.is_registered);

        info!(
            address = %address,
            overall,
            base_score,
            risk_level = tier.code(),
            confidence,
            "Score calculated"
        );

        ScoreRecord {
            agent_address: address.to_string(),
            overall,
            tx_success: tx_score,
            x402_profitability: x402_score,
            erc8004_stability: erc_score,
            risk_level: tier,
            risk_level_name: tier.name().to_string(),
            confidence,
            timestamp: Utc::now(),
            breakdown: ScoreBreakdown {
                weights: self.weights,
                base_score,
                sources: SourceBreakdown {
                    tx_success: tx_result,
                    x402_profitability: x402_result,
                    erc8004_stability: erc_result,
                },
                anti_gaming: trail,
            },
        }
    }

    /// Run the adjustment chain on its own task so a panicking chain fails
    /// open like an erroring one.
    async fn adjust(
        &self,
        address: &str,
        base_score: u32,
        activity: ActivityHistory,
        reference: DateTime<Utc>,
    ) -> AdjustmentTrail {
        let chain = Arc::clone(&self.chain);
        let owned_address = address.to_string();
        let task = tokio::spawn(async move {
            chain
                .apply(&owned_address, base_score, &activity, reference)
                .await
        });

        match task.await {
            Ok(Ok(trail)) => trail,
            Ok(Err(e)) => {
                warn!(
                    address = %address,
                    error = %e,
                    "Anti-gaming adjustment failed, using base score"
                );
                AdjustmentTrail::failed(base_score, e.to_string())
            }
            Err(e) => {
                let message = if e.is_panic() {
                    "anti-gaming adjustment panicked".to_string()
                } else {
                    format!("anti-gaming adjustment was cancelled: {e}")
                };
                warn!(address = %address, error = %e, "{message}, using base score");
                AdjustmentTrail::failed(base_score, message)
            }
        }
    }
}
