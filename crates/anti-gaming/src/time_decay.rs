//! Time decay: recent activity outweighs old activity.
//!
//! Transactions are bucketed into day-range windows by age. A window with
//! too few transactions is skipped, and an empty most-recent window costs the
//! agent a flat penalty, so a good record from months ago cannot carry a
//! dormant agent.

use chrono::{DateTime, Utc};
use fico_core::types::{simple_success_rate, AgentTransaction};
use serde::{Deserialize, Serialize};

use crate::config::AntiGamingConfig;

const SECONDS_PER_DAY: i64 = 86_400;

/// Per-window diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStat {
    pub name: String,
    pub tx_count: usize,
    /// `None` when the window had too few transactions to count.
    pub success_rate: Option<f64>,
    pub weight: f64,
    pub contribution: f64,
}

impl WindowStat {
    pub fn is_sufficient(&self) -> bool {
        self.success_rate.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeDecayOutcome {
    /// Decayed success rate in [0, 1].
    pub weighted_success_rate: f64,
    pub decay_applied: bool,
    pub windows: Vec<WindowStat>,
    /// Set when the most recent window lacked data.
    pub no_activity_penalty: Option<f64>,
    pub total_transactions: usize,
}

/// Whole days between `timestamp` and `reference`, floored.
fn days_ago(reference: DateTime<Utc>, timestamp: DateTime<Utc>) -> i64 {
    (reference - timestamp).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Weighted success rate across decay windows.
///
/// When the stage is disabled the plain success rate is returned with
/// `decay_applied = false`.
pub fn apply_time_decay(
    config: &AntiGamingConfig,
    transactions: &[AgentTransaction],
    reference: DateTime<Utc>,
) -> TimeDecayOutcome {
    if !config.flags.time_decay {
        return TimeDecayOutcome {
            weighted_success_rate: simple_success_rate(transactions),
            decay_applied: false,
            windows: Vec::new(),
            no_activity_penalty: None,
            total_transactions: transactions.len(),
        };
    }

    let settings = &config.time_decay;
    let windows = &settings.decay_windows;
    let min_txs = settings.min_transactions_per_window;

    let mut buckets: Vec<Vec<&AgentTransaction>> = vec![Vec::new(); windows.len()];
    for tx in transactions {
        let age = days_ago(reference, tx.timestamp);
        if let Some(index) = windows.iter().position(|window| window.contains(age)) {
            buckets[index].push(tx);
        }
    }

    let mut weighted_success = 0.0;
    let mut total_weight = 0.0;
    let mut stats = Vec::with_capacity(windows.len());

    for (index, (window, txs)) in windows.iter().zip(&buckets).enumerate() {
        let name = window
            .name
            .clone()
            .unwrap_or_else(|| format!("window_{index}"));

        if txs.len() >= min_txs && !txs.is_empty() {
            let successes = txs.iter().filter(|tx| tx.is_success()).count();
            let rate = successes as f64 / txs.len() as f64;
            let volume = window.weight * txs.len() as f64;
            weighted_success += rate * volume;
            total_weight += volume;
            stats.push(WindowStat {
                name,
                tx_count: txs.len(),
                success_rate: Some(rate),
                weight: window.weight,
                contribution: rate * window.weight,
            });
        } else {
            stats.push(WindowStat {
                name,
                tx_count: txs.len(),
                success_rate: None,
                weight: window.weight,
                contribution: 0.0,
            });
        }
    }

    let recent = buckets.first().map_or(0, Vec::len);
    let no_activity_penalty = if recent < min_txs || recent == 0 {
        weighted_success *= settings.no_activity_penalty;
        Some(settings.no_activity_penalty)
    } else {
        None
    };

    let rate = if total_weight > 0.0 {
        weighted_success / total_weight
    } else {
        0.0
    };

    TimeDecayOutcome {
        weighted_success_rate: rate.clamp(0.0, 1.0),
        decay_applied: true,
        windows: stats,
        no_activity_penalty,
        total_transactions: transactions.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureFlags;
    use chrono::{Duration, TimeZone};
    use fico_core::types::TxStatus;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn tx_at(days: i64, hours: i64, status: TxStatus) -> AgentTransaction {
        AgentTransaction {
            hash: format!("0x{days}{hours}"),
            from: "0xagent".to_string(),
            to: "0xpeer".to_string(),
            value_usd: 5.0,
            status,
            timestamp: reference() - Duration::days(days) - Duration::hours(hours),
            input: None,
        }
    }

    fn batch(days: i64, successes: usize, failures: usize) -> Vec<AgentTransaction> {
        let mut txs: Vec<_> = (0..successes)
            .map(|i| tx_at(days, i as i64 % 12, TxStatus::Success))
            .collect();
        txs.extend((0..failures).map(|i| tx_at(days, i as i64 % 12, TxStatus::Failed)));
        txs
    }

    #[test]
    fn test_recent_window_weighted_by_volume() {
        let mut txs = batch(1, 4, 0);
        txs.extend(batch(10, 2, 2));

        let outcome = apply_time_decay(&AntiGamingConfig::default(), &txs, reference());

        // (1.0 * 1.0 * 4 + 0.5 * 0.5 * 4) / (1.0 * 4 + 0.5 * 4)
        assert!((outcome.weighted_success_rate - 5.0 / 6.0).abs() < 1e-9);
        assert!(outcome.decay_applied);
        assert_eq!(outcome.no_activity_penalty, None);
        assert_eq!(outcome.windows.len(), 4);
        assert_eq!(outcome.windows[0].name, "window_0");
        assert_eq!(outcome.windows[2].tx_count, 0);
        assert!(!outcome.windows[2].is_sufficient());
        assert_eq!(outcome.total_transactions, 8);
    }

    #[test]
    fn test_no_recent_activity_penalty() {
        let txs = batch(40, 5, 0);

        let outcome = apply_time_decay(&AntiGamingConfig::default(), &txs, reference());

        assert!((outcome.weighted_success_rate - 0.9).abs() < 1e-9);
        assert_eq!(outcome.no_activity_penalty, Some(0.9));
    }

    #[test]
    fn test_sparse_windows_are_skipped() {
        let mut txs = batch(2, 3, 0);
        txs.extend(batch(100, 0, 2));

        let outcome = apply_time_decay(&AntiGamingConfig::default(), &txs, reference());

        assert!((outcome.weighted_success_rate - 1.0).abs() < 1e-9);
        assert_eq!(outcome.windows[3].tx_count, 2);
        assert_eq!(outcome.windows[3].success_rate, None);
    }

    #[test]
    fn test_partial_day_floors() {
        // 6 days 23 hours old is still inside the 0-7 window.
        let txs: Vec<_> = (0..3).map(|_| tx_at(6, 23, TxStatus::Success)).collect();
        let outcome = apply_time_decay(&AntiGamingConfig::default(), &txs, reference());
        assert_eq!(outcome.windows[0].tx_count, 3);

        assert_eq!(days_ago(reference(), reference() + Duration::hours(1)), -1);
    }

    #[test]
    fn test_future_transactions_fall_outside_windows() {
        let txs: Vec<_> = (0..5).map(|_| tx_at(-2, 0, TxStatus::Success)).collect();
        let outcome = apply_time_decay(&AntiGamingConfig::default(), &txs, reference());
        assert_eq!(outcome.weighted_success_rate, 0.0);
        assert!(outcome.windows.iter().all(|w| w.tx_count == 0));
    }

    #[test]
    fn test_disabled_uses_simple_rate() {
        let config = AntiGamingConfig::default().with_flags(FeatureFlags::NONE);
        let txs = batch(1, 3, 1);

        let outcome = apply_time_decay(&config, &txs, reference());

        assert!(!outcome.decay_applied);
        assert!((outcome.weighted_success_rate - 0.75).abs() < 1e-9);
        assert!(outcome.windows.is_empty());
    }

    #[test]
    fn test_empty_history() {
        let outcome = apply_time_decay(&AntiGamingConfig::default(), &[], reference());
        assert_eq!(outcome.weighted_success_rate, 0.0);
        assert_eq!(outcome.no_activity_penalty, Some(0.9));
    }
}
