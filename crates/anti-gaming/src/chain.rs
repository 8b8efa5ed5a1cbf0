//! The adjustment chain: runs the enabled stages in order on a base score.
//!
//! Order is fixed: time decay, anomaly penalty, consistency bonus,
//! transaction quality. Only the anomaly penalty and the consistency bonus
//! move the running score; the other two are recorded as signals. The
//! running score stays a float until the final round-and-clamp.

use chrono::{DateTime, Utc};
use fico_core::types::ActivityHistory;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::anomaly::{detect_anomaly, AnomalyOutcome};
use crate::config::{AntiGamingConfig, CoefficientStore};
use crate::consistency::{calculate_consistency_bonus, ConsistencyOutcome};
use crate::error::{AdjustmentError, Result};
use crate::time_decay::{apply_time_decay, TimeDecayOutcome};
use crate::tx_quality::{assess_transaction_quality, TxQualityOutcome};

/// Highest overall score.
pub const MAX_SCORE: u32 = 1000;

/// How a stage acts on the running score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustmentEffect {
    Multiplier(f64),
    Additive(f64),
    Informational,
}

impl AdjustmentEffect {
    pub fn apply(self, running: f64) -> f64 {
        match self {
            AdjustmentEffect::Multiplier(factor) => running * factor,
            AdjustmentEffect::Additive(points) => running + points,
            AdjustmentEffect::Informational => running,
        }
    }
}

/// Result of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum AdjustmentEntry {
    TimeDecay(TimeDecayOutcome),
    AnomalyPenalty(AnomalyOutcome),
    ConsistencyBonus(ConsistencyOutcome),
    TxQuality(TxQualityOutcome),
}

impl AdjustmentEntry {
    pub fn stage(&self) -> &'static str {
        match self {
            AdjustmentEntry::TimeDecay(_) => "time_decay",
            AdjustmentEntry::AnomalyPenalty(_) => "anomaly_penalty",
            AdjustmentEntry::ConsistencyBonus(_) => "consistency_bonus",
            AdjustmentEntry::TxQuality(_) => "tx_quality",
        }
    }

    pub fn effect(&self) -> AdjustmentEffect {
        match self {
            AdjustmentEntry::AnomalyPenalty(outcome) => {
                AdjustmentEffect::Multiplier(outcome.penalty_factor)
            }
            AdjustmentEntry::ConsistencyBonus(outcome) => {
                AdjustmentEffect::Additive(outcome.bonus_points as f64)
            }
            AdjustmentEntry::TimeDecay(_) | AdjustmentEntry::TxQuality(_) => {
                AdjustmentEffect::Informational
            }
        }
    }
}

/// One applied stage and the running score after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentStep {
    #[serde(flatten)]
    pub entry: AdjustmentEntry,
    pub score_after: f64,
}

/// Audit record of a chain run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentTrail {
    pub applied: bool,
    pub base_score: u32,
    pub adjusted_score: u32,
    pub steps: Vec<AdjustmentStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AdjustmentTrail {
    /// No adjustment capability; the base score passes through.
    pub fn disabled(base_score: u32) -> Self {
        Self {
            applied: false,
            base_score,
            adjusted_score: base_score,
            steps: Vec::new(),
            error: None,
        }
    }

    /// The chain failed; the base score passes through with the error noted.
    pub fn failed(base_score: u32, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::disabled(base_score)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn entry(&self, stage: &str) -> Option<&AdjustmentEntry> {
        self.steps
            .iter()
            .map(|step| &step.entry)
            .find(|entry| entry.stage() == stage)
    }
}

/// Round and clamp a running score into [0, 1000].
pub fn finalize_score(running: f64) -> u32 {
    running.round().clamp(0.0, MAX_SCORE as f64) as u32
}

/// Run every enabled stage against `base_score`.
pub fn run_chain(
    config: &AntiGamingConfig,
    base_score: u32,
    activity: &ActivityHistory,
    reference: DateTime<Utc>,
) -> Result<AdjustmentTrail> {
    config.validate()?;

    let flags = config.flags;
    if !flags.any() {
        return Ok(AdjustmentTrail::disabled(base_score));
    }

    let mut entries = Vec::with_capacity(4);
    if flags.time_decay {
        entries.push(AdjustmentEntry::TimeDecay(apply_time_decay(
            config,
            &activity.transactions,
            reference,
        )));
    }
    if flags.anomaly {
        entries.push(AdjustmentEntry::AnomalyPenalty(detect_anomaly(
            config,
            &activity.current,
            &activity.historical,
        )?));
    }
    if flags.consistency {
        entries.push(AdjustmentEntry::ConsistencyBonus(calculate_consistency_bonus(
            config,
            &activity.performance,
            reference,
        )?));
    }
    if flags.tx_quality {
        entries.push(AdjustmentEntry::TxQuality(assess_transaction_quality(
            config,
            &activity.transactions,
        )));
    }

    let mut running = base_score as f64;
    let mut steps = Vec::with_capacity(entries.len());
    for entry in entries {
        running = entry.effect().apply(running);
        if !running.is_finite() {
            return Err(AdjustmentError::Stage {
                stage: entry.stage(),
                message: format!("running score became {running}"),
            });
        }
        debug!(stage = entry.stage(), running, "Applied anti-gaming stage");
        steps.push(AdjustmentStep {
            entry,
            score_after: running,
        });
    }

    Ok(AdjustmentTrail {
        applied: true,
        base_score,
        adjusted_score: finalize_score(running),
        steps,
        error: None,
    })
}

/// Adjusts a base score using an agent's activity.
#[async_trait::async_trait]
pub trait AdjustmentChain: Send + Sync {
    async fn apply(
        &self,
        address: &str,
        base_score: u32,
        activity: &ActivityHistory,
        reference: DateTime<Utc>,
    ) -> Result<AdjustmentTrail>;
}

/// Chain backed by a coefficient store.
pub struct AntiGamingChain {
    store: Arc<CoefficientStore>,
}

impl AntiGamingChain {
    pub fn new(store: Arc<CoefficientStore>) -> Self {
        Self { store }
    }

    /// Chain over a fixed in-memory configuration.
    pub fn with_config(config: AntiGamingConfig) -> Self {
        Self::new(Arc::new(CoefficientStore::fixed(config)))
    }

    pub fn store(&self) -> &Arc<CoefficientStore> {
        &self.store
    }
}

#[async_trait::async_trait]
impl AdjustmentChain for AntiGamingChain {
    async fn apply(
        &self,
        address: &str,
        base_score: u32,
        activity: &ActivityHistory,
        reference: DateTime<Utc>,
    ) -> Result<AdjustmentTrail> {
        let config = self.store.snapshot().await;
        let trail = run_chain(&config, base_score, activity, reference)?;

        info!(
            address = %address,
            base_score,
            adjusted_score = trail.adjusted_score,
            stages = trail.steps.len(),
            "Anti-gaming adjustments applied"
        );

        Ok(trail)
    }
}

/// Chain for builds and deployments without anti-gaming.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChain;

#[async_trait::async_trait]
impl AdjustmentChain for NoopChain {
    async fn apply(
        &self,
        _address: &str,
        base_score: u32,
        _activity: &ActivityHistory,
        _reference: DateTime<Utc>,
    ) -> Result<AdjustmentTrail> {
        Ok(AdjustmentTrail::disabled(base_score))
    }
}
