//! Anomaly detection: abrupt behavior changes are treated as suspicious.

use fico_core::types::PeriodMetrics;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};
use tracing::debug;

use crate::config::{AntiGamingConfig, RateOfChangeConfig, TxBurstConfig, ZScoreConfig};
use crate::error::{AdjustmentError, Result};

/// Success rate assumed for a period that reports none.
const DEFAULT_SUCCESS_RATE: f64 = 0.5;

/// Never take more than half the score.
pub const MIN_PENALTY_FACTOR: f64 = 0.5;

/// A check that fired. `score` is normalized to [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnomalyFlag {
    ZScore {
        score: f64,
        z_score: f64,
        threshold: f64,
    },
    RateOfChange {
        score: f64,
        change_percent: f64,
        threshold: f64,
    },
    TxBurst {
        score: f64,
        tx_count: u64,
        threshold: u64,
        window_hours: u32,
    },
}

impl AnomalyFlag {
    pub fn score(&self) -> f64 {
        match self {
            AnomalyFlag::ZScore { score, .. }
            | AnomalyFlag::RateOfChange { score, .. }
            | AnomalyFlag::TxBurst { score, .. } => *score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyOutcome {
    pub is_anomaly: bool,
    /// Mean of the fired check scores.
    pub anomaly_score: f64,
    pub flags: Vec<AnomalyFlag>,
    /// Multiplier for the running score, in [0.5, 1].
    pub penalty_factor: f64,
    /// How long the agent stays flagged; 0 when clean.
    pub flag_duration_days: u32,
}

impl AnomalyOutcome {
    pub fn clean() -> Self {
        Self {
            is_anomaly: false,
            anomaly_score: 0.0,
            flags: Vec::new(),
            penalty_factor: 1.0,
            flag_duration_days: 0,
        }
    }
}

fn check_metrics(label: &str, metrics: &PeriodMetrics) -> Result<()> {
    if !metrics.success_rate.is_finite() || metrics.success_rate < 0.0 {
        return Err(AdjustmentError::InvalidInput(format!(
            "{label} success rate is not a valid fraction: {}",
            metrics.success_rate
        )));
    }
    Ok(())
}

/// Run the enabled checks on the current period against history.
///
/// `historical` is ordered oldest first.
pub fn detect_anomaly(
    config: &AntiGamingConfig,
    current: &PeriodMetrics,
    historical: &[PeriodMetrics],
) -> Result<AnomalyOutcome> {
    if !config.flags.anomaly {
        return Ok(AnomalyOutcome::clean());
    }

    check_metrics("current", current)?;
    for period in historical {
        check_metrics("historical", period)?;
    }

    let settings = &config.anomaly;
    let methods = &settings.detection_methods;

    let flags: Vec<AnomalyFlag> = [
        methods
            .z_score
            .enabled
            .then(|| z_score_check(&methods.z_score, current, historical))
            .flatten(),
        methods
            .rate_of_change
            .enabled
            .then(|| rate_of_change_check(&methods.rate_of_change, current, historical))
            .flatten(),
        settings
            .patterns
            .tx_burst
            .as_ref()
            .and_then(|burst| tx_burst_check(burst, current)),
    ]
    .into_iter()
    .flatten()
    .collect();

    if flags.is_empty() {
        return Ok(AnomalyOutcome::clean());
    }

    let anomaly_score = flags.iter().map(AnomalyFlag::score).sum::<f64>() / flags.len() as f64;
    let immediate = settings.penalties.immediate_penalty_percent / 100.0;
    let penalty_factor = (1.0 - immediate * anomaly_score).max(MIN_PENALTY_FACTOR);

    debug!(
        checks = flags.len(),
        anomaly_score,
        penalty_factor,
        "Anomaly detected"
    );

    Ok(AnomalyOutcome {
        is_anomaly: true,
        anomaly_score,
        flags,
        penalty_factor,
        flag_duration_days: settings.penalties.flag_duration_days,
    })
}

/// Current transaction count against the historical distribution.
fn z_score_check(
    config: &ZScoreConfig,
    current: &PeriodMetrics,
    historical: &[PeriodMetrics],
) -> Option<AnomalyFlag> {
    if historical.len() < config.min_samples || historical.len() < 2 {
        return None;
    }

    let counts = Data::new(historical.iter().map(|m| m.tx_count as f64).collect::<Vec<_>>());
    let mean = counts.mean()?;
    let std_dev = counts.std_dev()?;
    if std_dev == 0.0 || !std_dev.is_finite() {
        return None;
    }

    let z_score = (current.tx_count as f64 - mean) / std_dev;
    (z_score.abs() > config.threshold).then(|| AnomalyFlag::ZScore {
        score: (z_score.abs() / (config.threshold * 2.0)).min(1.0),
        z_score,
        threshold: config.threshold,
    })
}

/// Success-rate jump against the most recent historical period.
fn rate_of_change_check(
    config: &RateOfChangeConfig,
    current: &PeriodMetrics,
    historical: &[PeriodMetrics],
) -> Option<AnomalyFlag> {
    let previous = historical.last()?.success_rate;
    let previous = if previous.is_finite() { previous } else { DEFAULT_SUCCESS_RATE };

    let change_percent = if previous > 0.0 {
        (current.success_rate - previous) / previous * 100.0
    } else {
        0.0
    };

    let threshold = config.max_weekly_increase_percent;
    (change_percent > threshold).then(|| AnomalyFlag::RateOfChange {
        score: (change_percent / (threshold * 2.0)).min(1.0),
        change_percent,
        threshold,
    })
}

/// Too many transactions inside the burst window.
fn tx_burst_check(config: &TxBurstConfig, current: &PeriodMetrics) -> Option<AnomalyFlag> {
    let tx_count = current.tx_count_24h.unwrap_or(current.tx_count);
    (tx_count > config.max_tx_count).then(|| AnomalyFlag::TxBurst {
        score: (tx_count as f64 / (config.max_tx_count as f64 * 2.0)).min(1.0),
        tx_count,
        threshold: config.max_tx_count,
        window_hours: config.window_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureFlags;

    fn period(tx_count: u64, success_rate: f64) -> PeriodMetrics {
        PeriodMetrics {
            tx_count,
            tx_count_24h: None,
            success_rate,
        }
    }

    fn all_checks() -> AntiGamingConfig {
        let mut config = AntiGamingConfig::default();
        config.anomaly.detection_methods.z_score.enabled = true;
        config.anomaly.detection_methods.rate_of_change.enabled = true;
        config.anomaly.patterns.tx_burst = Some(TxBurstConfig::default());
        config
    }

    fn steady_history() -> Vec<PeriodMetrics> {
        // mean 10, sample std dev 2
        [8, 12, 8, 12, 8, 12, 8, 12, 8, 12]
            .into_iter()
            .map(|count| period(count, 0.8))
            .collect()
    }

    #[test]
    fn test_clean_agent() {
        let outcome =
            detect_anomaly(&all_checks(), &period(11, 0.82), &steady_history())
                .unwrap();
        assert_eq!(outcome, AnomalyOutcome::clean());
    }

    #[test]
    fn test_default_config_runs_no_checks() {
        let mut current = period(500, 1.0);
        current.tx_count_24h = Some(250);
        let history = vec![period(10, 0.2); 12];

        let outcome = detect_anomaly(&AntiGamingConfig::default(), &current, &history).unwrap();
        assert_eq!(outcome, AnomalyOutcome::clean());
    }

    #[test]
    fn test_z_score_spike() {
        let history = steady_history();
        let counts = Data::new(history.iter().map(|m| m.tx_count as f64).collect::<Vec<_>>());
        let std_dev = counts.std_dev().unwrap();

        // z = 4.0 with the sample standard deviation.
        let current = period((10.0 + 4.0 * std_dev).round() as u64, 0.8);
        let outcome = detect_anomaly(&all_checks(), &current, &history).unwrap();

        assert!(outcome.is_anomaly);
        assert_eq!(outcome.flags.len(), 1);
        let AnomalyFlag::ZScore { z_score, score, .. } = &outcome.flags[0] else {
            panic!("expected a z-score flag, got {:?}", outcome.flags[0]);
        };
        assert!(*z_score > 3.0);
        assert!((*score - z_score / 6.0).abs() < 1e-9);
        assert_eq!(outcome.flag_duration_days, 14);
        assert!((outcome.penalty_factor - (1.0 - 0.1 * score)).abs() < 1e-9);
    }

    #[test]
    fn test_z_score_needs_min_samples() {
        let history: Vec<_> = steady_history().into_iter().take(9).collect();
        let outcome = detect_anomaly(&all_checks(), &period(500, 0.8), &history)
            .unwrap();
        assert!(outcome
            .flags
            .iter()
            .all(|flag| !matches!(flag, AnomalyFlag::ZScore { .. })));
    }

    #[test]
    fn test_rate_of_change_jump() {
        let history = vec![period(10, 0.5)];
        let outcome = detect_anomaly(&all_checks(), &period(10, 0.8), &history)
            .unwrap();

        // +60% against a 30% limit -> score 1.0
        assert_eq!(outcome.flags.len(), 1);
        assert!((outcome.anomaly_score - 1.0).abs() < 1e-9);
        assert!((outcome.penalty_factor - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_zero_previous_rate_is_no_change() {
        let history = vec![period(10, 0.0)];
        let outcome = detect_anomaly(&all_checks(), &period(10, 1.0), &history)
            .unwrap();
        assert!(!outcome.is_anomaly);
    }

    #[test]
    fn test_tx_burst_prefers_24h_count() {
        let mut current = period(50, 0.8);
        current.tx_count_24h = Some(150);
        let outcome = detect_anomaly(&all_checks(), &current, &[]).unwrap();

        let AnomalyFlag::TxBurst { score, tx_count, .. } = &outcome.flags[0] else {
            panic!("expected a burst flag");
        };
        assert_eq!(*tx_count, 150);
        assert!((*score - 0.75).abs() < 1e-9);

        let outcome = detect_anomaly(&all_checks(), &period(150, 0.8), &[]).unwrap();
        assert!(outcome.is_anomaly);
    }

    #[test]
    fn test_penalty_floor() {
        let mut config = all_checks();
        config.anomaly.penalties.immediate_penalty_percent = 100.0;

        let outcome = detect_anomaly(&config, &period(1000, 0.8), &[]).unwrap();
        assert_eq!(outcome.anomaly_score, 1.0);
        assert_eq!(outcome.penalty_factor, MIN_PENALTY_FACTOR);
    }

    #[test]
    fn test_mean_of_fired_checks() {
        let history = vec![period(10, 0.5)];
        let mut current = period(10, 0.8);
        current.tx_count_24h = Some(150);

        let outcome = detect_anomaly(&all_checks(), &current, &history).unwrap();
        assert_eq!(outcome.flags.len(), 2);
        assert!((outcome.anomaly_score - 0.875).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_rate_is_an_error() {
        let result = detect_anomaly(&all_checks(), &period(10, f64::NAN), &[]);
        assert!(matches!(result, Err(AdjustmentError::InvalidInput(_))));
    }

    #[test]
    fn test_disabled() {
        let config = all_checks().with_flags(FeatureFlags::NONE);
        let outcome = detect_anomaly(&config, &period(10_000, f64::NAN), &[]).unwrap();
        assert_eq!(outcome.penalty_factor, 1.0);
    }

    #[test]
    fn test_flag_serializes_tagged() {
        let flag = AnomalyFlag::TxBurst {
            score: 0.6,
            tx_count: 120,
            threshold: 100,
            window_hours: 24,
        };
        let json = serde_json::to_value(&flag).unwrap();
        assert_eq!(json["type"], "tx_burst");
        assert_eq!(json["tx_count"], 120);
    }
}
