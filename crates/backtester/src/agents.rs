//! Reference agents with known sub-scores and expected risk tiers.

use fico_core::types::RiskTier;
use fico_core::WeightSet;
use score_engine::{calculate_from_subscores, risk_tier};
use serde::{Deserialize, Serialize};

/// An agent profile used to validate a weighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleAgent {
    pub id: String,
    pub address: String,
    pub description: String,
    pub expected_tier: RiskTier,
    pub tx_success: u32,
    pub x402_profitability: u32,
    pub erc8004_stability: u32,
}

impl SampleAgent {
    fn new(
        id: &str,
        address: &str,
        description: &str,
        expected_tier: RiskTier,
        scores: (u32, u32, u32),
    ) -> Self {
        Self {
            id: id.to_string(),
            address: address.to_string(),
            description: description.to_string(),
            expected_tier,
            tx_success: scores.0,
            x402_profitability: scores.1,
            erc8004_stability: scores.2,
        }
    }
}

fn repeated_address(digit: char) -> String {
    format!("0x{}", digit.to_string().repeat(40))
}

/// The eight reference agents, in a fixed order.
///
/// Two of them (`tx_specialist`, `new_agent`) are expected to land one tier
/// away from what the default weighting gives them.
pub fn sample_agents() -> Vec<SampleAgent> {
    [
        (
            "excellent_trader",
            '1',
            "High success rate, profitable, well-registered",
            RiskTier::Excellent,
            (95, 90, 85),
        ),
        (
            "good_analyst",
            '2',
            "Good overall performance",
            RiskTier::Good,
            (80, 75, 70),
        ),
        (
            "average_bot",
            '3',
            "Average performance",
            RiskTier::Average,
            (70, 65, 60),
        ),
        (
            "struggling_agent",
            '4',
            "Below average, needs improvement",
            RiskTier::BelowAverage,
            (55, 60, 50),
        ),
        (
            "risky_agent",
            '5',
            "High risk, low performance",
            RiskTier::Poor,
            (40, 35, 30),
        ),
        (
            "tx_specialist",
            '6',
            "Great tx success, poor profitability",
            RiskTier::Average,
            (95, 30, 70),
        ),
        (
            "profitable_but_risky",
            '7',
            "High profit but low tx success",
            RiskTier::Average,
            (40, 95, 60),
        ),
        (
            "new_agent",
            '8',
            "New agent, limited history",
            RiskTier::BelowAverage,
            (60, 50, 20),
        ),
    ]
    .into_iter()
    .map(|(id, digit, description, tier, scores)| {
        SampleAgent::new(id, &repeated_address(digit), description, tier, scores)
    })
    .collect()
}

/// Sample agents expected to land in `tier`.
pub fn agents_by_tier(tier: RiskTier) -> Vec<SampleAgent> {
    sample_agents()
        .into_iter()
        .filter(|agent| agent.expected_tier == tier)
        .collect()
}

/// Build an agent whose expected tier is whatever the default weighting gives.
pub fn custom_agent(
    id: impl Into<String>,
    address: impl Into<String>,
    tx_success: u32,
    x402_profitability: u32,
    erc8004_stability: u32,
) -> SampleAgent {
    let overall = calculate_from_subscores(
        &WeightSet::DEFAULT,
        tx_success,
        x402_profitability,
        erc8004_stability,
    );

    SampleAgent {
        id: id.into(),
        address: address.into(),
        description: "Custom test agent".to_string(),
        expected_tier: risk_tier(overall),
        tx_success,
        x402_profitability,
        erc8004_stability,
    }
}
