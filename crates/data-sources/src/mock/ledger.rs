use chrono::{DateTime, Duration, Utc};
use fico_core::config::clamp_analysis_days;
use fico_core::types::{ActivityHistory, AgentTransaction, TxStatus, TxSuccessResult};
use fico_core::Result;
use rand::Rng;

use super::{
    derived_address, derived_hash, is_valid_address, seeded_rng, DEFAULT_SEED, MOCK_SOURCE,
};
use crate::source::{ActivitySource, TxSuccessSource};
use crate::summary::{build_activity_history, summarize_transactions};

/// Shortest history handed to the anti-gaming chain, so the longest
/// consistency tier is reachable.
pub const MIN_ACTIVITY_LOOKBACK_DAYS: u32 = 180;

/// Routers the mock agents trade through.
const DEFI_ROUTERS: &[&str] = &[
    "0x68b3465833fb72a70ecdf485e0e4c7bd8665fc45",
    "0x87870bca3f3fd6335c3f4ce8392d69350b4fa4e2",
    "0x1111111254eeb25477b68fb85ed929f73a960582",
];

const COUNTERPARTIES: usize = 8;

/// Per-agent behavior drawn once from the address.
#[derive(Debug, Clone, Copy)]
struct AgentBehavior {
    reliability: f64,
    max_daily_txs: u32,
    defi_share: f64,
}

/// Deterministic transaction history generator.
#[derive(Debug, Clone, Copy)]
pub struct MockLedger {
    seed: u64,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl MockLedger {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn behavior(&self, address: &str) -> AgentBehavior {
        let mut rng = seeded_rng(address, self.seed, "behavior");
        AgentBehavior {
            reliability: rng.gen_range(0.55..1.0),
            max_daily_txs: rng.gen_range(1..=6),
            defi_share: rng.gen_range(0.0..0.5),
        }
    }

    /// Transactions sent by `address` in the `days` before `now`.
    ///
    /// Each day is generated from its own stream, so a longer window extends
    /// a shorter one instead of reshuffling it.
    pub fn transactions(
        &self,
        address: &str,
        days: u32,
        now: DateTime<Utc>,
    ) -> Vec<AgentTransaction> {
        if !is_valid_address(address) || address.starts_with("0x00") {
            return Vec::new();
        }

        let days = clamp_analysis_days(days);
        let agent = address.to_lowercase();
        let behavior = self.behavior(&agent);
        let mut transactions = Vec::new();

        for day in 0..days {
            let mut rng = seeded_rng(&agent, self.seed, &format!("day-{day}"));
            let count = rng.gen_range(0..=behavior.max_daily_txs);

            for index in 0..count {
                let status = if rng.gen_bool(0.01) {
                    TxStatus::Pending
                } else if rng.gen_bool(behavior.reliability) {
                    TxStatus::Success
                } else {
                    TxStatus::Failed
                };

                let (to, input) = if rng.gen_bool(behavior.defi_share) {
                    let router = DEFI_ROUTERS[rng.gen_range(0..DEFI_ROUTERS.len())];
                    (router.to_string(), Some("0x414bf389".to_string()))
                } else {
                    let peer = rng.gen_range(0..COUNTERPARTIES);
                    let input = rng.gen_bool(0.3).then(|| "0xa9059cbb".to_string());
                    (derived_address(&format!("{agent}-peer-{peer}")), input)
                };

                let offset = Duration::days(day as i64)
                    + Duration::minutes(rng.gen_range(0..24 * 60));

                transactions.push(AgentTransaction {
                    hash: derived_hash(&format!("{agent}{day}-{index}{}", self.seed)),
                    from: agent.clone(),
                    to,
                    value_usd: 10f64.powf(rng.gen_range(-3.0..3.0)),
                    status,
                    timestamp: now - offset,
                    input,
                });
            }
        }

        transactions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        transactions
    }
}

/// Transaction success source backed by [`MockLedger`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MockTxSuccessSource {
    ledger: MockLedger,
}

impl MockTxSuccessSource {
    pub fn new(seed: u64) -> Self {
        Self {
            ledger: MockLedger::new(seed),
        }
    }
}

#[async_trait::async_trait]
impl TxSuccessSource for MockTxSuccessSource {
    async fn get_success_score(&self, address: &str, days: u32) -> Result<TxSuccessResult> {
        let now = Utc::now();
        let transactions = self.ledger.transactions(address, days, now);
        let mut result = summarize_transactions(address, days, &transactions, now);
        result.data_source = Some(MOCK_SOURCE.to_string());
        Ok(result)
    }
}

/// Activity source backed by [`MockLedger`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MockActivitySource {
    ledger: MockLedger,
}

impl MockActivitySource {
    pub fn new(seed: u64) -> Self {
        Self {
            ledger: MockLedger::new(seed),
        }
    }
}

#[async_trait::async_trait]
impl ActivitySource for MockActivitySource {
    async fn get_activity(&self, address: &str, days: u32) -> Result<ActivityHistory> {
        let now = Utc::now();
        let lookback = days.max(MIN_ACTIVITY_LOOKBACK_DAYS);
        let transactions = self.ledger.transactions(address, lookback, now);
        Ok(build_activity_history(transactions, now, lookback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const AGENT: &str = "0x1111111111111111111111111111111111111111";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_ledger_is_deterministic() {
        let ledger = MockLedger::default();
        let first = ledger.transactions(AGENT, 30, now());
        let second = ledger.transactions(&AGENT.to_uppercase().replace("0X", "0x"), 30, now());
        assert_eq!(first, second);
        assert!(first.iter().all(|tx| tx.from == AGENT));
        assert!(first.iter().all(|tx| now() - tx.timestamp < Duration::days(30)));
        assert!(first.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_longer_window_extends_shorter() {
        let ledger = MockLedger::default();
        let short = ledger.transactions(AGENT, 10, now());
        let long = ledger.transactions(AGENT, 40, now());
        for tx in &short {
            assert!(long.contains(tx));
        }
    }

    #[test]
    fn test_oversized_window_is_capped() {
        let ledger = MockLedger::default();
        let capped = ledger.transactions(AGENT, u32::MAX, now());
        assert_eq!(capped, ledger.transactions(AGENT, 365, now()));
    }

    #[test]
    fn test_unregistered_addresses_have_no_history() {
        let ledger = MockLedger::default();
        assert!(ledger
            .transactions("0x0011111111111111111111111111111111111111", 30, now())
            .is_empty());
        assert!(ledger.transactions("garbage", 30, now()).is_empty());
    }

    #[tokio::test]
    async fn test_tx_success_source() {
        let result = MockTxSuccessSource::default()
            .get_success_score(AGENT, 30)
            .await
            .unwrap();
        assert!(result.score <= 100);
        assert_eq!(result.period_days, 30);
        assert_eq!(result.data_source.as_deref(), Some(MOCK_SOURCE));
        assert_eq!(
            result.total_txs,
            result.successful_txs + result.failed_txs + result.pending_txs
        );
    }

    #[tokio::test]
    async fn test_activity_source_covers_lookback() {
        let history = MockActivitySource::default()
            .get_activity(AGENT, 30)
            .await
            .unwrap();
        assert_eq!(history.historical.len(), 24);
        assert!(history
            .performance
            .iter()
            .all(|entry| (0.0..=1.0).contains(&entry.success_rate)));
    }
}
