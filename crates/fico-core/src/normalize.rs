//! Piecewise-linear normalizers mapping raw measurements to 0-100 sub-scores.
//!
//! Every intermediate value is truncated toward zero before clamping, so
//! outputs match the published reference scores exactly.

use crate::types::{RegistryProfile, StabilityFactors};

/// Truncate toward zero and clamp into [0, 100].
fn to_sub_score(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().clamp(0.0, 100.0) as u32
}

/// Map a transaction success rate (0-100 %) to a score.
///
/// - 99%+ -> 100
/// - 95% -> 95, 90% -> 85, 80% -> 65, 50% -> 30
/// - below 50% collapses toward zero (x * 0.6)
pub fn tx_success_score(success_rate: f64) -> u32 {
    let x = success_rate;
    let raw = if x >= 99.0 {
        100.0
    } else if x >= 95.0 {
        95.0 + (x - 95.0) * 1.0
    } else if x >= 90.0 {
        85.0 + (x - 90.0) * 2.0
    } else if x >= 80.0 {
        65.0 + (x - 80.0) * 2.0
    } else if x >= 50.0 {
        30.0 + (x - 50.0) * 1.17
    } else {
        x * 0.6
    };
    to_sub_score(raw)
}

/// Map an ROI percentage to a score, centered on ROI 0 -> 50.
pub fn profitability_score(roi_percent: f64) -> u32 {
    let x = roi_percent;
    let raw = if x >= 100.0 {
        100.0
    } else if x >= 50.0 {
        75.0 + (x - 50.0) * 0.5
    } else if x >= 0.0 {
        50.0 + x * 0.5
    } else {
        // Same slope below -50; goes negative past -100 and clamps to 0.
        25.0 + (x + 50.0) * 0.5
    };
    to_sub_score(raw)
}

/// Return on expense as a percentage.
///
/// With no expense, any income counts as a capped 100% return.
pub fn roi_percent(total_income: f64, total_expense: f64) -> f64 {
    if total_expense > 0.0 {
        (total_income - total_expense) / total_expense * 100.0
    } else if total_income > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Stability score and its factor breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityScore {
    pub score: u32,
    pub factors: StabilityFactors,
}

/// Score registry stability.
///
/// `None` means the agent is not registered: no data, no credit, every
/// factor is zero.
pub fn stability_score(profile: Option<&RegistryProfile>) -> StabilityScore {
    let Some(profile) = profile else {
        return StabilityScore {
            score: 0,
            factors: StabilityFactors::default(),
        };
    };

    let level = u8::from(profile.verification_level) as u32;
    let metadata = (profile.metadata_completeness.max(0.0) * 0.2).trunc().min(20.0);
    let activity = ((profile.activity_days as f64 / 365.0).min(1.0) * 20.0).trunc();
    let reputation = (profile.reputation_score.max(0.0) / 5.0 * 10.0).trunc().min(10.0);

    let factors = StabilityFactors {
        registration: 20,
        verification: (level * 6).min(30),
        metadata: finite_points(metadata),
        activity: finite_points(activity),
        reputation: finite_points(reputation),
    };

    StabilityScore {
        score: factors.total().min(100),
        factors,
    }
}

fn finite_points(value: f64) -> u32 {
    if value.is_finite() {
        value as u32
    } else {
        0
    }
}
