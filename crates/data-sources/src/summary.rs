//! Turn raw transactions and payments into source result records.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use fico_core::config::clamp_analysis_days;
use fico_core::normalize::{profitability_score, roi_percent, tx_success_score};
use fico_core::types::{
    success_rate_percent, ActivityHistory, AgentTransaction, PerformanceEntry, PeriodMetrics,
    ProfitabilityResult, TxStatus, TxSuccessResult,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Length of one anti-gaming measurement period.
pub const PERIOD_DAYS: i64 = 7;

/// Direction of an x402 payment from the agent's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDirection {
    Incoming,
    Outgoing,
}

/// An x402 payment in USDC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub tx_hash: String,
    pub counterparty: String,
    pub amount_usdc: f64,
    pub direction: PaymentDirection,
    pub timestamp: DateTime<Utc>,
    pub service_type: String,
}

impl Payment {
    pub fn is_income(&self) -> bool {
        self.direction == PaymentDirection::Incoming
    }

    pub fn is_expense(&self) -> bool {
        self.direction == PaymentDirection::Outgoing
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Count statuses inside the trailing window and normalize the success rate.
///
/// Returns the no-data record when the window is empty.
pub fn summarize_transactions(
    address: &str,
    days: u32,
    transactions: &[AgentTransaction],
    now: DateTime<Utc>,
) -> TxSuccessResult {
    let days = clamp_analysis_days(days);
    let cutoff = now - Duration::days(days as i64);
    let recent: Vec<AgentTransaction> = transactions
        .iter()
        .filter(|tx| tx.timestamp >= cutoff)
        .cloned()
        .collect();

    if recent.is_empty() {
        return TxSuccessResult::no_data(
            address,
            days,
            format!("No transactions in the last {days} days"),
        );
    }

    let count = |status: TxStatus| recent.iter().filter(|tx| tx.status == status).count() as u64;
    let success_rate = success_rate_percent(&recent);

    TxSuccessResult {
        address: address.to_lowercase(),
        total_txs: recent.len() as u64,
        successful_txs: count(TxStatus::Success),
        failed_txs: count(TxStatus::Failed),
        pending_txs: count(TxStatus::Pending),
        success_rate: round2(success_rate),
        score: tx_success_score(success_rate),
        period_days: days,
        analyzed_at: now,
        data_source: None,
        reason: None,
    }
}

/// Income, expense and ROI over the given payments.
pub fn summarize_payments(address: &str, days: u32, payments: &[Payment]) -> ProfitabilityResult {
    let total = |keep: fn(&Payment) -> bool| -> f64 {
        payments.iter().filter(|p| keep(p)).map(|p| p.amount_usdc).sum()
    };
    let total_income = total(Payment::is_income);
    let total_expense = total(Payment::is_expense);
    let roi = roi_percent(total_income, total_expense);

    ProfitabilityResult {
        address: address.to_lowercase(),
        total_income: round2(total_income),
        total_expense: round2(total_expense),
        net_profit: round2(total_income - total_expense),
        roi_percent: round2(roi),
        score: profitability_score(roi),
        transaction_count: payments.len() as u64,
        period_days: days,
        data_source: None,
        reason: None,
    }
}

/// Success fraction over non-pending transactions, 0 when none completed.
fn success_fraction<'a>(transactions: impl IntoIterator<Item = &'a AgentTransaction>) -> f64 {
    let (completed, successful) = transactions
        .into_iter()
        .filter(|tx| !tx.is_pending())
        .fold((0u64, 0u64), |(completed, successful), tx| {
            (completed + 1, successful + u64::from(tx.is_success()))
        });
    if completed == 0 {
        0.0
    } else {
        successful as f64 / completed as f64
    }
}

fn period_metrics(transactions: &[&AgentTransaction], now: DateTime<Utc>) -> PeriodMetrics {
    let day_ago = now - Duration::days(1);
    PeriodMetrics {
        tx_count: transactions.len() as u64,
        tx_count_24h: Some(transactions.iter().filter(|tx| tx.timestamp >= day_ago).count() as u64),
        success_rate: success_fraction(transactions.iter().copied()),
    }
}

/// Group transactions into the inputs the anti-gaming chain reads.
///
/// The current period is the trailing week; earlier full weeks inside
/// `lookback_days` become the history, oldest first. Days with at least one
/// transaction become performance entries.
pub fn build_activity_history(
    transactions: Vec<AgentTransaction>,
    now: DateTime<Utc>,
    lookback_days: u32,
) -> ActivityHistory {
    let lookback = clamp_analysis_days(lookback_days) as i64;
    let transactions: Vec<AgentTransaction> = transactions
        .into_iter()
        .filter(|tx| tx.timestamp <= now && tx.timestamp > now - Duration::days(lookback))
        .collect();

    let periods = (lookback / PERIOD_DAYS).max(1);
    let mut buckets: Vec<Vec<&AgentTransaction>> = vec![Vec::new(); periods as usize];
    for tx in &transactions {
        let age_days = (now - tx.timestamp).num_days();
        let index = (age_days / PERIOD_DAYS) as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.push(tx);
        }
    }

    let current = period_metrics(&buckets[0], now);
    let historical = buckets[1..]
        .iter()
        .enumerate()
        .rev()
        .map(|(offset, bucket)| {
            let end = now - Duration::days(PERIOD_DAYS * (offset as i64 + 1));
            period_metrics(bucket, end)
        })
        .collect();

    let mut days: BTreeMap<NaiveDate, Vec<&AgentTransaction>> = BTreeMap::new();
    for tx in &transactions {
        days.entry(tx.timestamp.date_naive()).or_default().push(tx);
    }
    let performance = days
        .into_iter()
        .map(|(date, txs)| PerformanceEntry {
            date,
            success_rate: success_fraction(txs.iter().copied()),
            tx_count: txs.len() as u64,
        })
        .collect();

    ActivityHistory {
        transactions,
        current,
        historical,
        performance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    fn tx(days_ago: i64, status: TxStatus) -> AgentTransaction {
        AgentTransaction {
            hash: format!("0x{days_ago}"),
            from: "0xagent".to_string(),
            to: "0xpeer".to_string(),
            value_usd: 1.0,
            status,
            timestamp: now() - Duration::days(days_ago),
            input: None,
        }
    }

    fn payment(amount_usdc: f64, direction: PaymentDirection) -> Payment {
        Payment {
            tx_hash: "0xpay".to_string(),
            counterparty: "0xpeer".to_string(),
            amount_usdc,
            direction,
            timestamp: now(),
            service_type: "inference".to_string(),
        }
    }

    #[test]
    fn test_summarize_transactions() {
        let mut txs: Vec<_> = (0..142).map(|_| tx(3, TxStatus::Success)).collect();
        txs.extend((0..8).map(|_| tx(5, TxStatus::Failed)));
        txs.push(tx(1, TxStatus::Pending));
        // Outside the window
        txs.extend((0..20).map(|_| tx(45, TxStatus::Failed)));

        let result = summarize_transactions("0xAGENT", 30, &txs, now());

        assert_eq!(result.address, "0xagent");
        assert_eq!(result.total_txs, 151);
        assert_eq!(result.successful_txs, 142);
        assert_eq!(result.failed_txs, 8);
        assert_eq!(result.pending_txs, 1);
        assert_eq!(result.success_rate, 94.67);
        assert_eq!(result.score, 94);
        assert!(result.reason.is_none());
    }

    #[test]
    fn test_empty_window_is_no_data() {
        let txs = vec![tx(60, TxStatus::Success)];
        let result = summarize_transactions("0xagent", 30, &txs, now());
        assert_eq!(result.score, 0);
        assert!(result.reason.is_some());
    }

    #[test]
    fn test_summarize_payments() {
        let payments = vec![
            payment(1000.0, PaymentDirection::Incoming),
            payment(500.0, PaymentDirection::Incoming),
            payment(800.0, PaymentDirection::Outgoing),
        ];

        let result = summarize_payments("0xagent", 30, &payments);

        assert_eq!(result.total_income, 1500.0);
        assert_eq!(result.total_expense, 800.0);
        assert_eq!(result.net_profit, 700.0);
        assert_eq!(result.roi_percent, 87.5);
        assert_eq!(result.score, 93);
        assert_eq!(result.transaction_count, 3);
    }

    #[test]
    fn test_income_without_expense() {
        let result = summarize_payments(
            "0xagent",
            30,
            &[payment(10.0, PaymentDirection::Incoming)],
        );
        assert_eq!(result.roi_percent, 100.0);
        assert_eq!(result.score, 100);

        let empty = summarize_payments("0xagent", 30, &[]);
        assert_eq!(empty.roi_percent, 0.0);
        assert_eq!(empty.score, 50);
    }

    #[test]
    fn test_build_activity_history() {
        let mut txs = vec![
            tx(0, TxStatus::Success),
            tx(2, TxStatus::Success),
            tx(2, TxStatus::Failed),
            tx(8, TxStatus::Success),
            tx(20, TxStatus::Pending),
            tx(20, TxStatus::Success),
        ];
        // Beyond the lookback
        txs.push(tx(40, TxStatus::Failed));

        let history = build_activity_history(txs, now(), 28);

        assert_eq!(history.transactions.len(), 6);
        assert_eq!(history.current.tx_count, 3);
        assert_eq!(history.current.tx_count_24h, Some(1));
        assert!((history.current.success_rate - 2.0 / 3.0).abs() < 1e-9);

        // Weeks 1..3, oldest first
        assert_eq!(history.historical.len(), 3);
        assert_eq!(history.historical[0].tx_count, 0);
        assert_eq!(history.historical[1].tx_count, 2);
        assert_eq!(history.historical[1].success_rate, 1.0);
        assert_eq!(history.historical[2].tx_count, 1);

        assert_eq!(history.performance.len(), 4);
        assert!(history.performance.windows(2).all(|w| w[0].date < w[1].date));
        let busiest = history
            .performance
            .iter()
            .find(|entry| entry.tx_count == 2 && entry.success_rate == 0.5);
        assert!(busiest.is_some());
    }

    #[test]
    fn test_oversized_window_is_capped() {
        let txs = vec![tx(1, TxStatus::Success), tx(400, TxStatus::Success)];

        let result = summarize_transactions("0xagent", u32::MAX, &txs, now());
        assert_eq!(result.period_days, 365);
        assert_eq!(result.total_txs, 1);

        let history = build_activity_history(txs, now(), u32::MAX);
        assert_eq!(history.transactions.len(), 1);
        assert_eq!(history.historical.len(), 51);
    }

    #[test]
    fn test_empty_activity_history() {
        let history = build_activity_history(Vec::new(), now(), 30);
        assert!(history.transactions.is_empty());
        assert!(history.performance.is_empty());
        assert_eq!(history.current.tx_count, 0);
        assert_eq!(history.historical.len(), 3);
    }
}
