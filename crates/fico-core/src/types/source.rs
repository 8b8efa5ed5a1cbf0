//! Result records returned by the three score sources.
//!
//! Every record has a `no_data` constructor. An all-zero result is a valid
//! outcome meaning "not yet measurable", not a failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker stored in `data_source` for records built without real data.
pub const NO_DATA_SOURCE: &str = "nodata";

/// Transaction success measurement for an analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxSuccessResult {
    pub address: String,
    pub total_txs: u64,
    pub successful_txs: u64,
    pub failed_txs: u64,
    pub pending_txs: u64,
    /// Success rate over non-pending transactions (0-100, two decimals).
    pub success_rate: f64,
    /// Normalized score (0-100).
    pub score: u32,
    pub period_days: u32,
    pub analyzed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TxSuccessResult {
    pub fn no_data(address: &str, period_days: u32, reason: impl Into<String>) -> Self {
        Self {
            address: address.to_lowercase(),
            total_txs: 0,
            successful_txs: 0,
            failed_txs: 0,
            pending_txs: 0,
            success_rate: 0.0,
            score: 0,
            period_days,
            analyzed_at: Utc::now(),
            data_source: Some(NO_DATA_SOURCE.to_string()),
            reason: Some(reason.into()),
        }
    }
}

/// Payment profitability over an analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilityResult {
    pub address: String,
    pub total_income: f64,
    pub total_expense: f64,
    pub net_profit: f64,
    /// Return on expense as a percentage (two decimals).
    pub roi_percent: f64,
    /// Normalized score (0-100).
    pub score: u32,
    pub transaction_count: u64,
    pub period_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ProfitabilityResult {
    pub fn no_data(address: &str, period_days: u32, reason: impl Into<String>) -> Self {
        Self {
            address: address.to_lowercase(),
            total_income: 0.0,
            total_expense: 0.0,
            net_profit: 0.0,
            roi_percent: 0.0,
            score: 0,
            transaction_count: 0,
            period_days,
            data_source: Some(NO_DATA_SOURCE.to_string()),
            reason: Some(reason.into()),
        }
    }
}

/// Point contributions that make up the stability score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilityFactors {
    pub registration: u32,
    pub verification: u32,
    pub metadata: u32,
    pub activity: u32,
    pub reputation: u32,
}

impl StabilityFactors {
    pub fn total(&self) -> u32 {
        self.registration + self.verification + self.metadata + self.activity + self.reputation
    }
}

/// Registry stability measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityResult {
    pub address: String,
    pub is_registered: bool,
    pub verification_level: u8,
    pub metadata_completeness: f64,
    pub activity_days: u32,
    pub reputation_score: f64,
    /// Sum of `factors` (0-100).
    pub score: u32,
    pub factors: StabilityFactors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StabilityResult {
    pub fn no_data(address: &str, reason: impl Into<String>) -> Self {
        Self {
            address: address.to_lowercase(),
            is_registered: false,
            verification_level: 0,
            metadata_completeness: 0.0,
            activity_days: 0,
            reputation_score: 0.0,
            score: 0,
            factors: StabilityFactors::default(),
            data_source: Some(NO_DATA_SOURCE.to_string()),
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_records_are_zero() {
        let tx = TxSuccessResult::no_data("0xABC", 30, "no transactions");
        assert_eq!(tx.address, "0xabc");
        assert_eq!(tx.score, 0);
        assert_eq!(tx.total_txs, 0);
        assert_eq!(tx.data_source.as_deref(), Some(NO_DATA_SOURCE));

        let x402 = ProfitabilityResult::no_data("0xabc", 7, "no payments");
        assert_eq!(x402.score, 0);
        assert_eq!(x402.period_days, 7);

        let stability = StabilityResult::no_data("0xabc", "not registered");
        assert!(!stability.is_registered);
        assert_eq!(stability.factors, StabilityFactors::default());
        assert_eq!(stability.factors.total(), 0);
    }

    #[test]
    fn test_reason_omitted_when_absent() {
        let mut result = StabilityResult::no_data("0xabc", "n/a");
        result.reason = None;
        result.data_source = None;
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("reason").is_none());
        assert!(json.get("data_source").is_none());
        assert_eq!(json["factors"]["registration"], 0);
    }
}
