//! Transaction quality: not every transaction counts the same.
//!
//! Dust transfers and self-transfers carry almost no weight, so spamming
//! cheap transactions does not move the success rate.

use fico_core::types::{simple_success_rate, AgentTransaction};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::{AntiGamingConfig, InteractionTypes, ValueThresholds, ValueWeights};

/// Score reported when the stage is disabled.
pub const NEUTRAL_QUALITY_SCORE: f64 = 50.0;

/// Known DeFi contracts, lowercased, and the protocol each belongs to.
const KNOWN_DEFI_CONTRACTS: &[(&str, &str)] = &[
    // Uniswap V3 routers
    ("0x68b3465833fb72a70ecdf485e0e4c7bd8665fc45", "uniswap"),
    ("0xe592427a0aece92de3edee1f18e0157c05861564", "uniswap"),
    // Aave V3 pool
    ("0x87870bca3f3fd6335c3f4ce8392d69350b4fa4e2", "aave"),
    // 1inch router
    ("0x1111111254eeb25477b68fb85ed929f73a960582", "1inch"),
];

/// Protocol name for a known DeFi contract address.
pub fn identify_protocol(address: &str) -> Option<&'static str> {
    KNOWN_DEFI_CONTRACTS
        .iter()
        .find(|(contract, _)| contract.eq_ignore_ascii_case(address))
        .map(|(_, protocol)| *protocol)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxQualityOutcome {
    /// Quality in [0, 100].
    pub quality_score: f64,
    /// Success rate weighted by per-transaction quality, in [0, 1].
    pub weighted_success_rate: f64,
    pub diversity_bonus: f64,
    /// Repetition penalty in percent points.
    pub repetition_penalty_percent: f64,
    pub unique_protocols: usize,
    pub total_transactions: usize,
    pub enabled: bool,
}

fn value_weight(value_usd: f64, thresholds: &ValueThresholds, weights: &ValueWeights) -> f64 {
    if value_usd < thresholds.dust_usd {
        weights.dust
    } else if value_usd < thresholds.low_usd {
        weights.low
    } else if value_usd < thresholds.medium_usd {
        weights.medium
    } else {
        weights.high
    }
}

fn interaction_weight(tx: &AgentTransaction, types: &InteractionTypes) -> f64 {
    if tx.is_self_transfer() {
        types.self_transfer.weight
    } else if identify_protocol(&tx.to).is_some() {
        types.defi_interaction.weight
    } else if tx.is_contract_interaction() {
        types.contract_interaction.weight
    } else {
        types.simple_transfer.weight
    }
}

/// Weigh each transaction by value tier and interaction type, then apply
/// the diversity bonus and repetition penalty.
pub fn assess_transaction_quality(
    config: &AntiGamingConfig,
    transactions: &[AgentTransaction],
) -> TxQualityOutcome {
    if !config.flags.tx_quality {
        return TxQualityOutcome {
            quality_score: NEUTRAL_QUALITY_SCORE,
            weighted_success_rate: simple_success_rate(transactions),
            diversity_bonus: 0.0,
            repetition_penalty_percent: 0.0,
            unique_protocols: 0,
            total_transactions: transactions.len(),
            enabled: false,
        };
    }

    if transactions.is_empty() {
        return TxQualityOutcome {
            quality_score: 0.0,
            weighted_success_rate: 0.0,
            diversity_bonus: 0.0,
            repetition_penalty_percent: 0.0,
            unique_protocols: 0,
            total_transactions: 0,
            enabled: true,
        };
    }

    let settings = &config.tx_quality;
    let mut total_weight = 0.0;
    let mut success_weight = 0.0;
    let mut weighed = 0usize;
    let mut protocols = HashSet::new();
    let mut counterparties: HashMap<String, usize> = HashMap::new();

    for tx in transactions {
        let value = value_weight(
            tx.value_usd,
            &settings.value_thresholds,
            &settings.value_weights,
        );
        let weight = value * interaction_weight(tx, &settings.interaction_types);
        if !weight.is_finite() {
            continue;
        }
        weighed += 1;

        if let Some(protocol) = identify_protocol(&tx.to) {
            protocols.insert(protocol);
        }
        *counterparties.entry(tx.to.to_lowercase()).or_default() += 1;

        total_weight += weight;
        if tx.is_success() {
            success_weight += weight;
        }
    }

    let diversity = &settings.diversity_bonus;
    let diverse = protocols.len() >= diversity.min_unique_protocols;
    let diversity_bonus = if diversity.enabled && diverse {
        let extra = (protocols.len() - diversity.min_unique_protocols + 1) as f64;
        (extra * diversity.bonus_per_protocol).min(diversity.max_bonus)
    } else {
        0.0
    };

    let repetition = &settings.repetition_penalty;
    let repetition_penalty = if repetition.enabled {
        let raw: f64 = counterparties
            .values()
            .filter(|&&count| count > repetition.same_contract_threshold)
            .map(|&count| {
                (count - repetition.same_contract_threshold) as f64 * repetition.penalty_per_repeat
            })
            .sum();
        raw.min(repetition.max_penalty_percent / 100.0)
    } else {
        0.0
    };

    let base_quality = if weighed > 0 {
        total_weight / weighed as f64 * 100.0
    } else {
        0.0
    };
    let quality_score =
        (base_quality + diversity_bonus - repetition_penalty * 100.0).clamp(0.0, 100.0);

    TxQualityOutcome {
        quality_score,
        weighted_success_rate: if total_weight > 0.0 {
            success_weight / total_weight
        } else {
            0.0
        },
        diversity_bonus,
        repetition_penalty_percent: repetition_penalty * 100.0,
        unique_protocols: protocols.len(),
        total_transactions: transactions.len(),
        enabled: true,
    }
}
