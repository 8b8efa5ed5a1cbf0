//! Anti-gaming coefficient bundles.
//!
//! Each stage reads one JSON bundle from `<dir>/coefficients/<stage>.json`.
//! Coefficients are kept out of the public repository so they cannot be
//! tuned against; the built-in defaults here are conservative placeholders.
//! Fields missing from a bundle take their default value. A bundle that is
//! missing, unreadable or invalid is replaced by its defaults as a whole.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{AdjustmentError, Result};

/// Sub-directory of the config root holding the bundles.
pub const COEFFICIENTS_DIR: &str = "coefficients";

/// A day-range bucket. `days_to = None` is open-ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayWindow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub days_from: i64,
    #[serde(default)]
    pub days_to: Option<i64>,
    #[serde(default = "default_window_weight")]
    pub weight: f64,
}

fn default_window_weight() -> f64 {
    1.0
}

impl DecayWindow {
    pub fn new(days_from: i64, days_to: Option<i64>, weight: f64) -> Self {
        Self {
            name: None,
            days_from,
            days_to,
            weight,
        }
    }

    /// Inclusive lower bound, exclusive upper bound.
    pub fn contains(&self, days_ago: i64) -> bool {
        days_ago >= self.days_from && self.days_to.map_or(true, |to| days_ago < to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeDecayConfig {
    pub enabled: bool,
    pub decay_windows: Vec<DecayWindow>,
    pub min_transactions_per_window: usize,
    /// Multiplier applied when the most recent window lacks data.
    pub no_activity_penalty: f64,
}

impl Default for TimeDecayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            decay_windows: vec![
                DecayWindow::new(0, Some(7), 1.0),
                DecayWindow::new(7, Some(30), 0.5),
                DecayWindow::new(30, Some(90), 0.3),
                DecayWindow::new(90, None, 0.1),
            ],
            min_transactions_per_window: 3,
            no_activity_penalty: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZScoreConfig {
    pub enabled: bool,
    pub threshold: f64,
    pub min_samples: usize,
}

impl Default for ZScoreConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 3.0,
            min_samples: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateOfChangeConfig {
    pub enabled: bool,
    pub max_weekly_increase_percent: f64,
}

impl Default for RateOfChangeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_weekly_increase_percent: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxBurstConfig {
    pub max_tx_count: u64,
    pub window_hours: u32,
}

impl Default for TxBurstConfig {
    fn default() -> Self {
        Self {
            max_tx_count: 100,
            window_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionMethods {
    pub z_score: ZScoreConfig,
    pub rate_of_change: RateOfChangeConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyPatterns {
    /// `None` disables burst detection.
    pub tx_burst: Option<TxBurstConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyPenalties {
    pub immediate_penalty_percent: f64,
    pub flag_duration_days: u32,
}

impl Default for AnomalyPenalties {
    fn default() -> Self {
        Self {
            immediate_penalty_percent: 10.0,
            flag_duration_days: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub enabled: bool,
    pub detection_methods: DetectionMethods,
    pub patterns: AnomalyPatterns,
    pub penalties: AnomalyPenalties,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            detection_methods: DetectionMethods::default(),
            patterns: AnomalyPatterns::default(),
            penalties: AnomalyPenalties::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyTier {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_required_days")]
    pub required_days: u32,
    #[serde(default = "default_tier_success_rate")]
    pub min_success_rate: f64,
    #[serde(default)]
    pub bonus_points: u32,
}

fn default_required_days() -> u32 {
    30
}

fn default_tier_success_rate() -> f64 {
    0.8
}

impl ConsistencyTier {
    pub fn new(required_days: u32, bonus_points: u32) -> Self {
        Self {
            name: None,
            required_days,
            min_success_rate: default_tier_success_rate(),
            bonus_points,
        }
    }

    /// Configured name, or `"<days>d"`.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}d", self.required_days))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreakRules {
    pub break_tolerance_days: i64,
    pub min_activity_per_week: f64,
}

impl Default for StreakRules {
    fn default() -> Self {
        Self {
            break_tolerance_days: 3,
            min_activity_per_week: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyConfig {
    pub enabled: bool,
    pub tiers: Vec<ConsistencyTier>,
    pub streak_rules: StreakRules,
    pub max_total_bonus: u32,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tiers: vec![
                ConsistencyTier::new(30, 20),
                ConsistencyTier::new(90, 50),
                ConsistencyTier::new(180, 100),
            ],
            streak_rules: StreakRules::default(),
            max_total_bonus: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueThresholds {
    pub dust_usd: f64,
    pub low_usd: f64,
    pub medium_usd: f64,
}

impl Default for ValueThresholds {
    fn default() -> Self {
        Self {
            dust_usd: 0.01,
            low_usd: 1.0,
            medium_usd: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueWeights {
    pub dust: f64,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for ValueWeights {
    fn default() -> Self {
        Self {
            dust: 0.05,
            low: 0.3,
            medium: 0.7,
            high: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionWeight {
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionTypes {
    pub self_transfer: InteractionWeight,
    pub defi_interaction: InteractionWeight,
    pub contract_interaction: InteractionWeight,
    pub simple_transfer: InteractionWeight,
}

impl Default for InteractionTypes {
    fn default() -> Self {
        Self {
            self_transfer: InteractionWeight { weight: 0.1 },
            defi_interaction: InteractionWeight { weight: 1.0 },
            contract_interaction: InteractionWeight { weight: 0.7 },
            simple_transfer: InteractionWeight { weight: 0.4 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversityBonusConfig {
    pub enabled: bool,
    pub min_unique_protocols: usize,
    pub bonus_per_protocol: f64,
    pub max_bonus: f64,
}

impl Default for DiversityBonusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_unique_protocols: 3,
            bonus_per_protocol: 2.0,
            max_bonus: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepetitionPenaltyConfig {
    pub enabled: bool,
    pub same_contract_threshold: usize,
    pub penalty_per_repeat: f64,
    pub max_penalty_percent: f64,
}

impl Default for RepetitionPenaltyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            same_contract_threshold: 10,
            penalty_per_repeat: 0.05,
            max_penalty_percent: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxQualityConfig {
    pub enabled: bool,
    pub value_thresholds: ValueThresholds,
    pub value_weights: ValueWeights,
    pub interaction_types: InteractionTypes,
    pub diversity_bonus: DiversityBonusConfig,
    pub repetition_penalty: RepetitionPenaltyConfig,
}

impl Default for TxQualityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            value_thresholds: ValueThresholds::default(),
            value_weights: ValueWeights::default(),
            interaction_types: InteractionTypes::default(),
            diversity_bonus: DiversityBonusConfig::default(),
            repetition_penalty: RepetitionPenaltyConfig::default(),
        }
    }
}

/// A coefficient bundle stored as `coefficients/<NAME>.json`.
trait Bundle: DeserializeOwned + Default {
    const NAME: &'static str;

    fn enabled(&self) -> bool;

    fn validate(&self) -> Result<()>;
}

fn invalid(message: impl Into<String>) -> AdjustmentError {
    AdjustmentError::InvalidConfig(message.into())
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{field} must be a non-negative number, got {value}")))
    }
}

fn check_percent(field: &str, value: f64) -> Result<()> {
    check_non_negative(field, value)?;
    if value > 100.0 {
        return Err(invalid(format!("{field} must not exceed 100, got {value}")));
    }
    Ok(())
}

fn check_fraction(field: &str, value: f64) -> Result<()> {
    check_non_negative(field, value)?;
    if value > 1.0 {
        return Err(invalid(format!("{field} must not exceed 1.0, got {value}")));
    }
    Ok(())
}

impl Bundle for TimeDecayConfig {
    const NAME: &'static str = "time_decay";

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn validate(&self) -> Result<()> {
        for window in &self.decay_windows {
            check_non_negative("decay_windows.weight", window.weight)?;
            if let Some(to) = window.days_to {
                if to <= window.days_from {
                    return Err(invalid(format!(
                        "decay window [{}, {}) is empty",
                        window.days_from, to
                    )));
                }
            }
        }
        check_fraction("no_activity_penalty", self.no_activity_penalty)
    }
}

impl Bundle for AnomalyConfig {
    const NAME: &'static str = "anomaly";

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn validate(&self) -> Result<()> {
        let methods = &self.detection_methods;
        if !(methods.z_score.threshold.is_finite() && methods.z_score.threshold > 0.0) {
            return Err(invalid("z_score.threshold must be positive"));
        }
        let max_increase = methods.rate_of_change.max_weekly_increase_percent;
        if !(max_increase.is_finite() && max_increase > 0.0) {
            return Err(invalid("rate_of_change.max_weekly_increase_percent must be positive"));
        }
        if let Some(burst) = &self.patterns.tx_burst {
            if burst.max_tx_count == 0 {
                return Err(invalid("tx_burst.max_tx_count must be positive"));
            }
        }
        check_percent(
            "penalties.immediate_penalty_percent",
            self.penalties.immediate_penalty_percent,
        )
    }
}

impl Bundle for ConsistencyConfig {
    const NAME: &'static str = "consistency";

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn validate(&self) -> Result<()> {
        for tier in &self.tiers {
            check_fraction("tiers.min_success_rate", tier.min_success_rate)?;
        }
        if self.streak_rules.break_tolerance_days < 0 {
            return Err(invalid("streak_rules.break_tolerance_days must not be negative"));
        }
        check_non_negative(
            "streak_rules.min_activity_per_week",
            self.streak_rules.min_activity_per_week,
        )
    }
}

impl Bundle for TxQualityConfig {
    const NAME: &'static str = "tx_quality";

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn validate(&self) -> Result<()> {
        let t = &self.value_thresholds;
        for (field, value) in [
            ("value_thresholds.dust_usd", t.dust_usd),
            ("value_thresholds.low_usd", t.low_usd),
            ("value_thresholds.medium_usd", t.medium_usd),
        ] {
            check_non_negative(field, value)?;
        }
        if !(t.dust_usd <= t.low_usd && t.low_usd <= t.medium_usd) {
            return Err(invalid("value_thresholds must be ascending"));
        }

        let w = &self.value_weights;
        let i = &self.interaction_types;
        for (field, value) in [
            ("value_weights.dust", w.dust),
            ("value_weights.low", w.low),
            ("value_weights.medium", w.medium),
            ("value_weights.high", w.high),
            ("interaction_types.self_transfer", i.self_transfer.weight),
            ("interaction_types.defi_interaction", i.defi_interaction.weight),
            ("interaction_types.contract_interaction", i.contract_interaction.weight),
            ("interaction_types.simple_transfer", i.simple_transfer.weight),
            ("diversity_bonus.bonus_per_protocol", self.diversity_bonus.bonus_per_protocol),
            ("diversity_bonus.max_bonus", self.diversity_bonus.max_bonus),
            ("repetition_penalty.penalty_per_repeat", self.repetition_penalty.penalty_per_repeat),
        ] {
            check_non_negative(field, value)?;
        }
        check_percent(
            "repetition_penalty.max_penalty_percent",
            self.repetition_penalty.max_penalty_percent,
        )
    }
}

/// Which stages run. Resolved once when the configuration is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub time_decay: bool,
    pub anomaly: bool,
    pub consistency: bool,
    pub tx_quality: bool,
}

impl FeatureFlags {
    pub const ALL: Self = Self {
        time_decay: true,
        anomaly: true,
        consistency: true,
        tx_quality: true,
    };

    pub const NONE: Self = Self {
        time_decay: false,
        anomaly: false,
        consistency: false,
        tx_quality: false,
    };

    /// Apply `AG_<STAGE>_ENABLED` overrides; `true`, `1` and `yes` enable a
    /// stage, any other value disables it.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let resolve = |stage: &str, current: bool| -> bool {
            match lookup(&format!("AG_{}_ENABLED", stage.to_uppercase())) {
                Some(value) => matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
                None => current,
            }
        };

        self.time_decay = resolve(TimeDecayConfig::NAME, self.time_decay);
        self.anomaly = resolve(AnomalyConfig::NAME, self.anomaly);
        self.consistency = resolve(ConsistencyConfig::NAME, self.consistency);
        self.tx_quality = resolve(TxQualityConfig::NAME, self.tx_quality);
        self
    }

    pub fn any(&self) -> bool {
        self.time_decay || self.anomaly || self.consistency || self.tx_quality
    }
}

/// Complete, immutable anti-gaming configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntiGamingConfig {
    pub time_decay: TimeDecayConfig,
    pub anomaly: AnomalyConfig,
    pub consistency: ConsistencyConfig,
    pub tx_quality: TxQualityConfig,
    pub flags: FeatureFlags,
}

impl Default for AntiGamingConfig {
    fn default() -> Self {
        Self::from_bundles(
            TimeDecayConfig::default(),
            AnomalyConfig::default(),
            ConsistencyConfig::default(),
            TxQualityConfig::default(),
        )
    }
}

impl AntiGamingConfig {
    /// Build from bundles, taking each stage flag from its `enabled` field.
    pub fn from_bundles(
        time_decay: TimeDecayConfig,
        anomaly: AnomalyConfig,
        consistency: ConsistencyConfig,
        tx_quality: TxQualityConfig,
    ) -> Self {
        let flags = FeatureFlags {
            time_decay: time_decay.enabled(),
            anomaly: anomaly.enabled(),
            consistency: consistency.enabled(),
            tx_quality: tx_quality.enabled(),
        };
        Self {
            time_decay,
            anomaly,
            consistency,
            tx_quality,
            flags,
        }
    }

    /// Load every bundle from `dir` and resolve flags against the process
    /// environment.
    pub fn load(dir: Option<&Path>) -> Self {
        Self::load_with_env(dir, |key| std::env::var(key).ok())
    }

    pub fn load_with_env(dir: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::from_bundles(
            load_bundle(dir),
            load_bundle(dir),
            load_bundle(dir),
            load_bundle(dir),
        );
        config.flags = config.flags.with_overrides(lookup);
        debug!(flags = ?config.flags, "Resolved anti-gaming feature flags");
        config
    }

    pub fn with_flags(mut self, flags: FeatureFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.time_decay.validate()?;
        self.anomaly.validate()?;
        self.consistency.validate()?;
        self.tx_quality.validate()
    }
}

fn bundle_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(COEFFICIENTS_DIR).join(format!("{name}.json"))
}

fn read_bundle<T: DeserializeOwned>(path: &Path) -> std::result::Result<T, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Json))
        .build()?
        .try_deserialize()
}

fn load_bundle<T: Bundle>(dir: Option<&Path>) -> T {
    let Some(dir) = dir else {
        warn!(
            bundle = T::NAME,
            "No config directory, using default coefficients (not production values)"
        );
        return T::default();
    };

    let path = bundle_path(dir, T::NAME);
    if !path.exists() {
        warn!(
            bundle = T::NAME,
            path = %path.display(),
            "Coefficient file not found, using default coefficients (not production values)"
        );
        return T::default();
    }

    match read_bundle::<T>(&path) {
        Ok(bundle) => match bundle.validate() {
            Ok(()) => {
                info!(bundle = T::NAME, path = %path.display(), "Loaded anti-gaming coefficients");
                bundle
            }
            Err(e) => {
                warn!(bundle = T::NAME, error = %e, "Rejected coefficient file, using defaults");
                T::default()
            }
        },
        Err(e) => {
            warn!(bundle = T::NAME, error = %e, "Failed to read coefficient file, using defaults");
            T::default()
        }
    }
}

#[derive(Debug, Clone)]
enum Origin {
    Directory(Option<PathBuf>),
    Fixed,
}

/// Shared, read-only configuration snapshot with explicit reload.
#[derive(Debug)]
pub struct CoefficientStore {
    origin: Origin,
    current: RwLock<Arc<AntiGamingConfig>>,
}

impl CoefficientStore {
    /// Load from a config directory. `None` means built-in defaults.
    pub fn load(dir: Option<PathBuf>) -> Self {
        let config = AntiGamingConfig::load(dir.as_deref());
        Self {
            origin: Origin::Directory(dir),
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Wrap an in-memory configuration. Reloading keeps it unchanged.
    pub fn fixed(config: AntiGamingConfig) -> Self {
        Self {
            origin: Origin::Fixed,
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub async fn snapshot(&self) -> Arc<AntiGamingConfig> {
        self.current.read().await.clone()
    }

    /// Re-read every bundle and swap the snapshot.
    ///
    /// Snapshots handed out earlier stay valid and unchanged.
    pub async fn reload(&self) -> Arc<AntiGamingConfig> {
        let dir = match &self.origin {
            Origin::Directory(dir) => dir.clone(),
            Origin::Fixed => {
                debug!("Coefficient store is fixed, reload skipped");
                return self.snapshot().await;
            }
        };

        let fresh = Arc::new(AntiGamingConfig::load(dir.as_deref()));
        *self.current.write().await = fresh.clone();
        info!("Anti-gaming configs reloaded");
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "agentfico-coefficients-{}-{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(dir.join(COEFFICIENTS_DIR)).unwrap();
        dir
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_enable_every_stage() {
        let config = AntiGamingConfig::default();
        assert_eq!(config.flags, FeatureFlags::ALL);
        assert_eq!(config.time_decay.decay_windows.len(), 4);
        assert_eq!(config.anomaly.detection_methods.z_score.threshold, 3.0);
        assert_eq!(config.consistency.tiers.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_sub_checks_are_off() {
        let config = AntiGamingConfig::default();
        assert!(!config.anomaly.detection_methods.z_score.enabled);
        assert!(!config.anomaly.detection_methods.rate_of_change.enabled);
        assert_eq!(config.anomaly.patterns.tx_burst, None);
        assert!(!config.tx_quality.diversity_bonus.enabled);
        assert!(!config.tx_quality.repetition_penalty.enabled);
    }

    #[test]
    fn test_missing_dir_falls_back_to_defaults() {
        let config = AntiGamingConfig::load_with_env(Some(Path::new("/no/such/dir")), no_env);
        assert_eq!(config, AntiGamingConfig::default());

        let config = AntiGamingConfig::load_with_env(None, no_env);
        assert_eq!(config, AntiGamingConfig::default());
    }

    #[test]
    fn test_partial_bundle_keeps_field_defaults() {
        let dir = temp_config_dir("partial");
        std::fs::write(
            bundle_path(&dir, "anomaly"),
            r#"{"enabled": true, "penalties": {"immediate_penalty_percent": 40}}"#,
        )
        .unwrap();
        std::fs::write(
            bundle_path(&dir, "time_decay"),
            r#"{"enabled": false, "decay_windows": [
                {"days_from": 0, "days_to": 14, "weight": 1.0},
                {"days_from": 14, "days_to": null, "weight": 0.2}
            ]}"#,
        )
        .unwrap();

        let config = AntiGamingConfig::load_with_env(Some(&dir), no_env);
        assert_eq!(config.anomaly.penalties.immediate_penalty_percent, 40.0);
        assert_eq!(config.anomaly.penalties.flag_duration_days, 14);
        assert_eq!(config.anomaly.detection_methods.z_score.min_samples, 10);
        assert!(!config.flags.time_decay);
        assert_eq!(config.time_decay.decay_windows.len(), 2);
        assert_eq!(config.time_decay.decay_windows[1].days_to, None);
        assert_eq!(config.time_decay.min_transactions_per_window, 3);
        assert!(!config.anomaly.detection_methods.z_score.enabled);
        assert_eq!(config.anomaly.patterns.tx_burst, None);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bundle_enables_sub_checks() {
        let dir = temp_config_dir("sub_checks");
        std::fs::write(
            bundle_path(&dir, "anomaly"),
            r#"{"detection_methods": {
                    "z_score": {"enabled": true},
                    "rate_of_change": {"enabled": true}
                },
                "patterns": {"tx_burst": {"max_tx_count": 50}}}"#,
        )
        .unwrap();
        std::fs::write(
            bundle_path(&dir, "tx_quality"),
            r#"{"diversity_bonus": {"enabled": true}, "repetition_penalty": {"enabled": true}}"#,
        )
        .unwrap();

        let config = AntiGamingConfig::load_with_env(Some(&dir), no_env);
        let methods = &config.anomaly.detection_methods;
        assert!(methods.z_score.enabled);
        assert_eq!(methods.z_score.threshold, 3.0);
        assert!(methods.rate_of_change.enabled);
        assert_eq!(
            config.anomaly.patterns.tx_burst,
            Some(TxBurstConfig {
                max_tx_count: 50,
                window_hours: 24,
            })
        );
        assert!(config.tx_quality.diversity_bonus.enabled);
        assert!(config.tx_quality.repetition_penalty.enabled);
        assert_eq!(config.tx_quality.repetition_penalty.same_contract_threshold, 10);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_bundle_is_rejected() {
        let dir = temp_config_dir("invalid");
        std::fs::write(
            bundle_path(&dir, "tx_quality"),
            r#"{"value_thresholds": {"dust_usd": 5.0, "low_usd": 1.0, "medium_usd": 10.0}}"#,
        )
        .unwrap();
        std::fs::write(bundle_path(&dir, "consistency"), "{ not json").unwrap();

        let config = AntiGamingConfig::load_with_env(Some(&dir), no_env);
        assert_eq!(config.tx_quality, TxQualityConfig::default());
        assert_eq!(config.consistency, ConsistencyConfig::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_env_overrides_flags() {
        let lookup = |key: &str| match key {
            "AG_ANOMALY_ENABLED" => Some("false".to_string()),
            "AG_TX_QUALITY_ENABLED" => Some("YES".to_string()),
            "AG_TIME_DECAY_ENABLED" => Some("0".to_string()),
            _ => None,
        };
        let flags = FeatureFlags::ALL.with_overrides(lookup);
        assert!(!flags.anomaly);
        assert!(flags.tx_quality);
        assert!(!flags.time_decay);
        assert!(flags.consistency);

        let enabled = FeatureFlags::NONE.with_overrides(|key| {
            (key == "AG_CONSISTENCY_ENABLED").then(|| "1".to_string())
        });
        assert_eq!(
            enabled,
            FeatureFlags {
                time_decay: false,
                anomaly: false,
                consistency: true,
                tx_quality: false,
            }
        );
        assert!(enabled.any());
    }

    #[test]
    fn test_validation_catches_bad_values() {
        let mut config = AntiGamingConfig::default();
        config.time_decay.no_activity_penalty = 1.5;
        assert!(matches!(config.validate(), Err(AdjustmentError::InvalidConfig(_))));

        let mut config = AntiGamingConfig::default();
        config.anomaly.detection_methods.z_score.threshold = 0.0;
        assert!(config.validate().is_err());

        let mut config = AntiGamingConfig::default();
        config.time_decay.decay_windows = vec![DecayWindow::new(10, Some(5), 1.0)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_contains() {
        let window = DecayWindow::new(7, Some(30), 0.5);
        assert!(window.contains(7));
        assert!(window.contains(29));
        assert!(!window.contains(30));
        assert!(!window.contains(6));
        assert!(DecayWindow::new(90, None, 0.1).contains(10_000));
    }

    #[tokio::test]
    async fn test_store_reload_swaps_snapshot() {
        let dir = temp_config_dir("reload");
        let store = CoefficientStore::load(Some(dir.clone()));
        let before = store.snapshot().await;
        assert_eq!(before.anomaly.penalties.immediate_penalty_percent, 10.0);

        std::fs::write(
            bundle_path(&dir, "anomaly"),
            r#"{"penalties": {"immediate_penalty_percent": 25}}"#,
        )
        .unwrap();

        let after = store.reload().await;
        assert_eq!(after.anomaly.penalties.immediate_penalty_percent, 25.0);
        assert_eq!(before.anomaly.penalties.immediate_penalty_percent, 10.0);
        assert_eq!(
            store.snapshot().await.anomaly.penalties.immediate_penalty_percent,
            25.0
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_fixed_store_ignores_reload() {
        let config = AntiGamingConfig::default().with_flags(FeatureFlags::NONE);
        let store = CoefficientStore::fixed(config.clone());
        let reloaded = store.reload().await;
        assert_eq!(*reloaded, config);
    }
}
