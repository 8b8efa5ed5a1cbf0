//! Pure aggregation: weighted sub-scores, risk tier and confidence.

use fico_core::types::RiskTier;
use fico_core::WeightSet;

/// Highest sub-score.
pub const MAX_SUB_SCORE: u32 = 100;

/// Highest overall score.
pub const MAX_OVERALL: u32 = 1000;

/// Confidence before any data-quality credit.
pub const BASE_CONFIDENCE: u32 = 50;

/// Weighted sum of the sub-scores scaled to 0-1000, truncated.
///
/// Sub-scores above 100 are clamped first. The result is clamped as well,
/// since weights may sum to slightly more than 1.0.
pub fn calculate_from_subscores(
    weights: &WeightSet,
    tx_success: u32,
    x402: u32,
    erc8004: u32,
) -> u32 {
    let sub = |score: u32| score.min(MAX_SUB_SCORE) as f64;
    let weighted = sub(tx_success) * weights.tx_success()
        + sub(x402) * weights.x402_profitability()
        + sub(erc8004) * weights.erc8004_stability();

    (weighted * 10.0).trunc().clamp(0.0, MAX_OVERALL as f64) as u32
}

/// Risk tier for an overall score.
pub fn risk_tier(overall: u32) -> RiskTier {
    RiskTier::from_score(overall)
}

/// Trust in the data behind a score, 0-100.
///
/// Base 50, plus 10/20/30 for at least 10/50/100 transactions, plus 20 for a
/// registered agent.
pub fn estimate_confidence(total_txs: u64, is_registered: bool) -> u32 {
    let activity = match total_txs {
        n if n >= 100 => 30,
        n if n >= 50 => 20,
        n if n >= 10 => 10,
        _ => 0,
    };
    let registration = if is_registered { 20 } else { 0 };

    (BASE_CONFIDENCE + activity + registration).min(100)
}
