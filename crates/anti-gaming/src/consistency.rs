//! Consistency bonus for sustained good performance.
//!
//! Short-term manipulation cannot earn it: the top tier needs roughly six
//! months of qualifying days.

use chrono::{DateTime, NaiveDate, Utc};
use fico_core::types::PerformanceEntry;
use serde::{Deserialize, Serialize};

use crate::config::{AntiGamingConfig, StreakRules};
use crate::error::{AdjustmentError, Result};

/// Minimum success rate for a day to extend the streak.
pub const QUALIFYING_SUCCESS_RATE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    /// Number of qualifying entries before the streak broke.
    pub days: u32,
    /// Mean success rate over the qualifying entries.
    pub avg_success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyOutcome {
    pub bonus_points: u32,
    pub achieved_tier: Option<String>,
    pub streak_days: u32,
    pub avg_success_rate: f64,
    pub tiers_checked: usize,
}

impl ConsistencyOutcome {
    fn none() -> Self {
        Self {
            bonus_points: 0,
            achieved_tier: None,
            streak_days: 0,
            avg_success_rate: 0.0,
            tiers_checked: 0,
        }
    }
}

/// Award the highest tier whose streak length and average success rate are
/// both met, capped at `max_total_bonus`.
pub fn calculate_consistency_bonus(
    config: &AntiGamingConfig,
    history: &[PerformanceEntry],
    reference: DateTime<Utc>,
) -> Result<ConsistencyOutcome> {
    if !config.flags.consistency {
        return Ok(ConsistencyOutcome::none());
    }

    if let Some(bad) = history.iter().find(|entry| !entry.success_rate.is_finite()) {
        return Err(AdjustmentError::InvalidInput(format!(
            "performance entry for {} has success rate {}",
            bad.date, bad.success_rate
        )));
    }

    let settings = &config.consistency;
    let streak = calculate_streak(history, reference.date_naive(), &settings.streak_rules);

    let mut tiers: Vec<_> = settings.tiers.iter().collect();
    tiers.sort_by(|a, b| b.required_days.cmp(&a.required_days));

    let achieved = tiers.into_iter().find(|tier| {
        streak.days >= tier.required_days && streak.avg_success_rate >= tier.min_success_rate
    });

    Ok(ConsistencyOutcome {
        bonus_points: achieved
            .map_or(0, |tier| tier.bonus_points)
            .min(settings.max_total_bonus),
        achieved_tier: achieved.map(|tier| tier.label()),
        streak_days: streak.days,
        avg_success_rate: streak.avg_success_rate,
        tiers_checked: settings.tiers.len(),
    })
}

/// Walk the history newest first, counting qualifying entries.
///
/// A non-qualifying entry adds a break; a qualifying one resets the break
/// count. The walk stops at the first gap wider than the tolerance once the
/// break count has also reached it.
pub fn calculate_streak(
    history: &[PerformanceEntry],
    reference: NaiveDate,
    rules: &StreakRules,
) -> Streak {
    let mut sorted: Vec<&PerformanceEntry> = history.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let tolerance = rules.break_tolerance_days;
    let min_daily_activity = rules.min_activity_per_week / 7.0;

    let mut days = 0u32;
    let mut total_rate = 0.0;
    let mut breaks = 0i64;
    let mut cursor = reference;

    for entry in sorted {
        let gap = (cursor - entry.date).num_days();
        if gap > tolerance && breaks >= tolerance {
            break;
        }

        let active = entry.tx_count as f64 >= min_daily_activity;
        if active && entry.success_rate >= QUALIFYING_SUCCESS_RATE {
            days += 1;
            total_rate += entry.success_rate;
            breaks = 0;
        } else {
            breaks += 1;
        }
        cursor = entry.date;
    }

    Streak {
        days,
        avg_success_rate: if days > 0 { total_rate / days as f64 } else { 0.0 },
    }
}
