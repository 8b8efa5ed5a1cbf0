//! On-chain activity records consumed by success-rate calculation and the
//! anti-gaming stages.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Transaction execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failed,
    Pending,
}

/// A transaction sent by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTransaction {
    pub hash: String,
    pub from: String,
    pub to: String,
    /// Transferred value in USD.
    pub value_usd: f64,
    pub status: TxStatus,
    pub timestamp: DateTime<Utc>,
    /// Calldata, `None` or `"0x"` for plain transfers.
    #[serde(default)]
    pub input: Option<String>,
}

impl AgentTransaction {
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }

    pub fn is_pending(&self) -> bool {
        self.status == TxStatus::Pending
    }

    /// True when the transaction carries calldata.
    pub fn is_contract_interaction(&self) -> bool {
        matches!(self.input.as_deref(), Some(input) if !input.is_empty() && input != "0x")
    }

    pub fn is_self_transfer(&self) -> bool {
        self.from.eq_ignore_ascii_case(&self.to)
    }
}

/// Aggregate metrics for one measurement period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub tx_count: u64,
    /// Transactions in the trailing 24 hours, when known.
    #[serde(default)]
    pub tx_count_24h: Option<u64>,
    /// Success rate as a fraction (0-1).
    pub success_rate: f64,
}

/// One day of performance, used for consistency streaks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub date: NaiveDate,
    /// Success rate as a fraction (0-1).
    pub success_rate: f64,
    pub tx_count: u64,
}

/// Everything the anti-gaming chain looks at for one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityHistory {
    pub transactions: Vec<AgentTransaction>,
    pub current: PeriodMetrics,
    /// Earlier periods, oldest first.
    pub historical: Vec<PeriodMetrics>,
    pub performance: Vec<PerformanceEntry>,
}

impl ActivityHistory {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.historical.is_empty() && self.performance.is_empty()
    }
}

/// Success rate over non-pending transactions as a percentage (0-100).
///
/// Returns 0 when there is nothing to measure.
pub fn success_rate_percent(transactions: &[AgentTransaction]) -> f64 {
    let completed = transactions.iter().filter(|tx| !tx.is_pending()).count();
    if completed == 0 {
        return 0.0;
    }

    let successful = transactions.iter().filter(|tx| tx.is_success()).count();
    (successful as f64 / completed as f64) * 100.0
}

/// Fraction of successful transactions, counting every status.
pub fn simple_success_rate(transactions: &[AgentTransaction]) -> f64 {
    if transactions.is_empty() {
        return 0.0;
    }
    transactions.iter().filter(|tx| tx.is_success()).count() as f64 / transactions.len() as f64
}
