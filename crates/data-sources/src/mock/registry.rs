use fico_core::normalize::stability_score;
use fico_core::types::{RegistryProfile, StabilityResult, VerificationLevel};
use fico_core::Result;
use std::collections::HashMap;
use tracing::debug;

use super::{address_digest, is_valid_address, DEFAULT_SEED, MOCK_SOURCE};
use crate::source::StabilitySource;

const NOT_REGISTERED_REASON: &str = "Agent not registered in ERC-8004 registry";

fn profile(
    name: &str,
    verification_level: VerificationLevel,
    activity_days: u32,
    metadata_completeness: f64,
    reputation_score: f64,
) -> RegistryProfile {
    RegistryProfile {
        name: name.to_string(),
        verification_level,
        activity_days,
        metadata_completeness,
        reputation_score,
    }
}

/// Mock ERC-8004 registry.
///
/// Four fixture agents cover the score range. Other well-formed addresses
/// get a profile derived from their hash, except addresses starting with
/// `0x00`, which are treated as unregistered.
#[derive(Debug, Clone)]
pub struct MockStabilitySource {
    seed: u64,
    agents: HashMap<String, RegistryProfile>,
}

impl Default for MockStabilitySource {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl MockStabilitySource {
    pub fn new(seed: u64) -> Self {
        let agents = [
            (
                "0x1111111111111111111111111111111111111111",
                profile("TradingBot Alpha", VerificationLevel::Premium, 365, 100.0, 4.8),
            ),
            (
                "0x2222222222222222222222222222222222222222",
                profile("DataAgent Beta", VerificationLevel::Standard, 90, 70.0, 3.5),
            ),
            (
                "0x3333333333333333333333333333333333333333",
                profile("NewAgent Gamma", VerificationLevel::Unverified, 7, 30.0, 1.0),
            ),
            (
                "0x4444444444444444444444444444444444444444",
                profile("PaymentBot Delta", VerificationLevel::Advanced, 180, 85.0, 4.2),
            ),
        ]
        .into_iter()
        .map(|(address, profile)| (address.to_string(), profile))
        .collect();

        Self { seed, agents }
    }

    /// Registry profile for `address`, `None` when unregistered.
    pub fn profile(&self, address: &str) -> Option<RegistryProfile> {
        let normalized = address.to_lowercase();
        if let Some(known) = self.agents.get(&normalized) {
            return Some(known.clone());
        }

        if !is_valid_address(&normalized) || normalized.starts_with("0x00") {
            return None;
        }

        let bytes = address_digest(&normalized, self.seed);
        Some(RegistryProfile {
            name: format!("Agent-{}", &normalized[2..8]),
            verification_level: VerificationLevel::from_byte(bytes[0]),
            activity_days: (bytes[1] as u32 * bytes[2] as u32) % 730,
            metadata_completeness: 30.0 + (bytes[3] % 71) as f64,
            reputation_score: (10 + (bytes[4] % 41) as u32) as f64 / 10.0,
        })
    }
}

#[async_trait::async_trait]
impl StabilitySource for MockStabilitySource {
    async fn get_stability(&self, address: &str) -> Result<StabilityResult> {
        let Some(profile) = self.profile(address) else {
            debug!(address = %address, "Agent not registered");
            let mut result = StabilityResult::no_data(address, NOT_REGISTERED_REASON);
            result.data_source = Some(MOCK_SOURCE.to_string());
            return Ok(result);
        };

        let stability = stability_score(Some(&profile));
        Ok(StabilityResult {
            address: address.to_lowercase(),
            is_registered: true,
            verification_level: profile.verification_level.into(),
            metadata_completeness: profile.metadata_completeness,
            activity_days: profile.activity_days,
            reputation_score: profile.reputation_score,
            score: stability.score,
            factors: stability.factors,
            data_source: Some(MOCK_SOURCE.to_string()),
            reason: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_agents() {
        let source = MockStabilitySource::default();

        let alpha = source
            .get_stability("0x1111111111111111111111111111111111111111")
            .await
            .unwrap();
        assert!(alpha.is_registered);
        assert_eq!(alpha.verification_level, 4);
        assert_eq!(alpha.score, 93);

        let beta = source
            .get_stability("0x2222222222222222222222222222222222222222")
            .await
            .unwrap();
        // 20 + 12 + 14 + 4 + 7
        assert_eq!(beta.score, 57);

        let gamma = source
            .get_stability("0x3333333333333333333333333333333333333333")
            .await
            .unwrap();
        // 20 + 0 + 6 + 0 + 2
        assert_eq!(gamma.score, 28);

        let delta = source
            .get_stability("0x4444444444444444444444444444444444444444")
            .await
            .unwrap();
        // 20 + 18 + 17 + 9 + 8
        assert_eq!(delta.score, 72);
    }

    #[tokio::test]
    async fn test_unregistered_addresses() {
        let source = MockStabilitySource::default();
        for address in ["0x00aa000000000000000000000000000000000000", "not-an-address", "0x12"] {
            let result = source.get_stability(address).await.unwrap();
            assert!(!result.is_registered);
            assert_eq!(result.score, 0);
            assert_eq!(result.factors.total(), 0);
            assert_eq!(result.reason.as_deref(), Some(NOT_REGISTERED_REASON));
        }
    }

    #[test]
    fn test_derived_profile_is_deterministic_and_bounded() {
        let source = MockStabilitySource::default();
        let address = "0xAbCdEf0123456789abcdef0123456789ABCDEF01";

        let first = source.profile(address).unwrap();
        let second = source.profile(&address.to_lowercase()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.name, "Agent-abcdef");
        assert!(first.activity_days < 730);
        assert!((30.0..=100.0).contains(&first.metadata_completeness));
        assert!((1.0..=5.0).contains(&first.reputation_score));
    }
}
