use chrono::{DateTime, Duration, Utc};
use fico_core::types::ProfitabilityResult;
use fico_core::Result;
use rand::Rng;

use super::{derived_address, derived_hash, seeded_rng, DEFAULT_SEED, MOCK_SOURCE};
use crate::source::ProfitabilitySource;
use crate::summary::{summarize_payments, Payment, PaymentDirection};

const SERVICE_TYPES: &[&str] = &["api_call", "compute", "data", "storage", "inference"];

/// Mock x402 payment history.
///
/// Between 10 and 50 payments per window, 60% incoming. Incoming amounts
/// run larger than outgoing ones, so most agents are profitable.
#[derive(Debug, Clone, Copy)]
pub struct MockProfitabilitySource {
    seed: u64,
}

impl Default for MockProfitabilitySource {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl MockProfitabilitySource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn payments(&self, address: &str, days: u32, now: DateTime<Utc>) -> Vec<Payment> {
        if days == 0 {
            return Vec::new();
        }

        let agent = address.to_lowercase();
        let mut rng = seeded_rng(&agent, self.seed, "x402");
        let count = rng.gen_range(10..=50);
        let window_minutes = days as i64 * 24 * 60;

        let mut payments: Vec<Payment> = (0..count)
            .map(|index| {
                let direction = if rng.gen_bool(0.6) {
                    PaymentDirection::Incoming
                } else {
                    PaymentDirection::Outgoing
                };
                let amount = match direction {
                    PaymentDirection::Incoming => rng.gen_range(10.0..200.0),
                    PaymentDirection::Outgoing => rng.gen_range(5.0..100.0),
                };

                Payment {
                    tx_hash: derived_hash(&format!("{agent}{index}{}", self.seed)),
                    counterparty: derived_address(&format!("counterparty{index}{agent}")),
                    amount_usdc: (amount * 100.0_f64).round() / 100.0,
                    direction,
                    timestamp: now - Duration::minutes(rng.gen_range(0..window_minutes)),
                    service_type: SERVICE_TYPES[rng.gen_range(0..SERVICE_TYPES.len())].to_string(),
                }
            })
            .collect();

        payments.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        payments
    }
}

#[async_trait::async_trait]
impl ProfitabilitySource for MockProfitabilitySource {
    async fn get_profitability(&self, address: &str, days: u32) -> Result<ProfitabilityResult> {
        let payments = self.payments(address, days, Utc::now());
        let mut result = summarize_payments(address, days, &payments);
        result.data_source = Some(MOCK_SOURCE.to_string());
        Ok(result)
    }
}
