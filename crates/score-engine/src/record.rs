//! Score output records.

use anti_gaming::AdjustmentTrail;
use chrono::{DateTime, Utc};
use fico_core::types::{ProfitabilityResult, RiskTier, StabilityResult, TxSuccessResult};
use fico_core::WeightSet;
use serde::{Deserialize, Serialize};

/// Raw results from each source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceBreakdown {
    pub tx_success: TxSuccessResult,
    pub x402_profitability: ProfitabilityResult,
    pub erc8004_stability: StabilityResult,
}

/// How an overall score was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub weights: WeightSet,
    /// Weighted score before anti-gaming adjustments.
    pub base_score: u32,
    pub sources: SourceBreakdown,
    pub anti_gaming: AdjustmentTrail,
}

/// Immutable snapshot of one score calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub agent_address: String,
    /// 0-1000
    pub overall: u32,
    pub tx_success: u32,
    pub x402_profitability: u32,
    pub erc8004_stability: u32,
    pub risk_level: RiskTier,
    pub risk_level_name: String,
    /// 0-100
    pub confidence: u32,
    pub timestamp: DateTime<Utc>,
    pub breakdown: ScoreBreakdown,
}

impl ScoreRecord {
    pub fn is_adjusted(&self) -> bool {
        self.breakdown.anti_gaming.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_camel_case_json() {
        let address = "0xabc";
        let record = ScoreRecord {
            agent_address: address.to_string(),
            overall: 780,
            tx_success: 80,
            x402_profitability: 70,
            erc8004_stability: 90,
            risk_level: RiskTier::Good,
            risk_level_name: RiskTier::Good.name().to_string(),
            confidence: 80,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 29, 12, 0, 0).unwrap(),
            breakdown: ScoreBreakdown {
                weights: WeightSet::DEFAULT,
                base_score: 780,
                sources: SourceBreakdown {
                    tx_success: TxSuccessResult::no_data(address, 30, "none"),
                    x402_profitability: ProfitabilityResult::no_data(address, 30, "none"),
                    erc8004_stability: StabilityResult::no_data(address, "none"),
                },
                anti_gaming: AdjustmentTrail::disabled(780),
            },
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["agentAddress"], "0xabc");
        assert_eq!(json["x402Profitability"], 70);
        assert_eq!(json["erc8004Stability"], 90);
        assert_eq!(json["riskLevel"], 2);
        assert_eq!(json["riskLevelName"], "good");
        assert_eq!(json["timestamp"], "2025-01-29T12:00:00Z");
        assert_eq!(json["breakdown"]["weights"]["tx_success"], 0.4);
        assert_eq!(json["breakdown"]["sources"]["txSuccess"]["score"], 0);
        assert_eq!(json["breakdown"]["antiGaming"]["applied"], false);

        let parsed: ScoreRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
        assert!(!parsed.is_adjusted());
    }
}
