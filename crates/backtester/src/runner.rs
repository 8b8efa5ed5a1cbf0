//! Runs sample agents through the aggregation and compares tiers.

use std::collections::BTreeMap;

use fico_core::types::RiskTier;
use fico_core::WeightSet;
use score_engine::{calculate_from_subscores, risk_tier};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};
use tracing::{debug, info};

use crate::agents::SampleAgent;
use crate::error::{BacktestError, Result};

/// Accuracy at which the current weighting is considered a good fit.
pub const FIT_ACCURACY: f64 = 0.8;

/// Accuracy below which the weighting needs to be re-examined.
pub const ADJUST_ACCURACY: f64 = 0.6;

/// Outcome for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub agent_id: String,
    pub address: String,
    pub expected_tier: RiskTier,
    pub actual_tier: RiskTier,
    pub overall_score: u32,
    pub tx_success: u32,
    pub x402_profitability: u32,
    pub erc8004_stability: u32,
    pub is_correct: bool,
}

/// Aggregate outcome of a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub weights: WeightSet,
    pub total_agents: usize,
    pub correct_predictions: usize,
    /// Share of agents whose actual tier matched, 0.0 when there are none.
    pub accuracy: f64,
    /// Agents per actual tier. Tiers nobody landed in are absent.
    pub score_distribution: BTreeMap<RiskTier, usize>,
    pub avg_score: f64,
    pub min_score: u32,
    pub max_score: u32,
    /// Sample standard deviation, 0.0 for fewer than two agents.
    pub score_std: f64,
    pub results: Vec<BacktestResult>,
}

impl BacktestSummary {
    /// Count for a tier, zero when absent.
    pub fn tier_count(&self, tier: RiskTier) -> usize {
        self.score_distribution.get(&tier).copied().unwrap_or(0)
    }
}

/// One weighting in a sensitivity comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationResult {
    pub weights: WeightSet,
    pub accuracy: f64,
    pub avg_score: f64,
    pub score_std: f64,
    pub distribution: BTreeMap<RiskTier, usize>,
}

/// Comparison of several weightings over the same agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityAnalysis {
    pub variations: Vec<VariationResult>,
    pub best_accuracy: f64,
    /// First weighting reaching the best accuracy.
    pub best_weights: WeightSet,
    pub recommendation: String,
}

/// The weightings compared by default: the 40/40/20 baseline, a tx-heavy
/// and a profitability-heavy split, and a near-even split.
pub fn default_weight_variations() -> Result<Vec<WeightSet>> {
    [
        (0.40, 0.40, 0.20),
        (0.50, 0.30, 0.20),
        (0.30, 0.50, 0.20),
        (0.33, 0.33, 0.34),
    ]
    .into_iter()
    .map(|(tx, x402, erc8004)| WeightSet::new(tx, x402, erc8004).map_err(BacktestError::from))
    .collect()
}

/// Scores sample agents with a weighting and checks their tiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktestRunner {
    weights: WeightSet,
}

impl BacktestRunner {
    pub fn new(weights: WeightSet) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    /// Backtest with the runner's own weights.
    pub fn run_backtest(&self, agents: &[SampleAgent]) -> BacktestSummary {
        self.run_with_weights(agents, &self.weights)
    }

    /// Backtest with an explicit weighting.
    pub fn run_with_weights(&self, agents: &[SampleAgent], weights: &WeightSet) -> BacktestSummary {
        let results: Vec<BacktestResult> = agents
            .iter()
            .map(|agent| {
                let overall = calculate_from_subscores(
                    weights,
                    agent.tx_success,
                    agent.x402_profitability,
                    agent.erc8004_stability,
                );
                let actual_tier = risk_tier(overall);

                BacktestResult {
                    agent_id: agent.id.clone(),
                    address: agent.address.clone(),
                    expected_tier: agent.expected_tier,
                    actual_tier,
                    overall_score: overall,
                    tx_success: agent.tx_success,
                    x402_profitability: agent.x402_profitability,
                    erc8004_stability: agent.erc8004_stability,
                    is_correct: agent.expected_tier == actual_tier,
                }
            })
            .collect();

        let mut score_distribution = BTreeMap::new();
        for result in &results {
            *score_distribution.entry(result.actual_tier).or_insert(0) += 1;
        }

        let scores: Vec<u32> = results.iter().map(|r| r.overall_score).collect();
        let correct_predictions = results.iter().filter(|r| r.is_correct).count();
        let total_agents = results.len();

        let accuracy = if total_agents > 0 {
            correct_predictions as f64 / total_agents as f64
        } else {
            0.0
        };

        let avg_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64
        };

        let score_std = if scores.len() > 1 {
            Data::new(scores.iter().map(|&s| s as f64).collect::<Vec<_>>())
                .std_dev()
                .filter(|std| std.is_finite())
                .unwrap_or(0.0)
        } else {
            0.0
        };

        debug!(
            total_agents,
            correct_predictions,
            accuracy,
            "Backtest run complete"
        );

        BacktestSummary {
            weights: *weights,
            total_agents,
            correct_predictions,
            accuracy,
            score_distribution,
            avg_score,
            min_score: scores.iter().copied().min().unwrap_or(0),
            max_score: scores.iter().copied().max().unwrap_or(0),
            score_std,
            results,
        }
    }

    /// Backtest each weighting and recommend the most accurate one.
    ///
    /// Ties go to the earliest weighting in `variations`.
    pub fn analyze_weight_sensitivity(
        &self,
        agents: &[SampleAgent],
        variations: &[WeightSet],
    ) -> Result<SensitivityAnalysis> {
        let results: Vec<VariationResult> = variations
            .iter()
            .map(|weights| {
                let summary = self.run_with_weights(agents, weights);
                VariationResult {
                    weights: *weights,
                    accuracy: summary.accuracy,
                    avg_score: summary.avg_score,
                    score_std: summary.score_std,
                    distribution: summary.score_distribution,
                }
            })
            .collect();

        let best = results
            .iter()
            .fold(None::<&VariationResult>, |best, candidate| match best {
                Some(current) if current.accuracy >= candidate.accuracy => Some(current),
                _ => Some(candidate),
            })
            .ok_or(BacktestError::NoVariations)?;

        let recommendation = recommend(best);
        info!(
            variations = results.len(),
            best_accuracy = best.accuracy,
            "Weight sensitivity analysed"
        );

        Ok(SensitivityAnalysis {
            best_accuracy: best.accuracy,
            best_weights: best.weights,
            recommendation,
            variations: results,
        })
    }
}

pub(crate) fn percent(share: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, share * 100.0)
}

pub(crate) fn describe_weights(weights: &WeightSet) -> String {
    format!(
        "tx={}, x402={}, erc8004={}",
        percent(weights.tx_success(), 0),
        percent(weights.x402_profitability(), 0),
        percent(weights.erc8004_stability(), 0),
    )
}

fn recommend(best: &VariationResult) -> String {
    let accuracy = percent(best.accuracy, 1);
    if best.accuracy >= FIT_ACCURACY {
        format!("Current weights fit. Accuracy: {accuracy}")
    } else if best.accuracy >= ADJUST_ACCURACY {
        format!(
            "Weight adjustment recommended. Best: {} (accuracy: {accuracy})",
            describe_weights(&best.weights)
        )
    } else {
        format!("Weights need re-examination. Best accuracy: {accuracy}")
    }
}
