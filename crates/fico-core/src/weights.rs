//! Component weights for the overall score.
//!
//! A [`WeightSet`] can only be obtained through validation, so any value of
//! this type is known to sum to 1.0 within [`WEIGHT_TOLERANCE`].

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Maximum allowed distance between the weight sum and 1.0.
pub const WEIGHT_TOLERANCE: f64 = 0.001;

/// Validated weights for the three score components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct WeightSet {
    tx_success: f64,
    x402_profitability: f64,
    erc8004_stability: f64,
}

/// Unvalidated weights as they appear in configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
struct RawWeights {
    tx_success: f64,
    x402_profitability: f64,
    erc8004_stability: f64,
}

impl TryFrom<RawWeights> for WeightSet {
    type Error = Error;

    fn try_from(raw: RawWeights) -> Result<Self> {
        Self::new(raw.tx_success, raw.x402_profitability, raw.erc8004_stability)
    }
}

impl WeightSet {
    /// Default weighting: 40% tx success, 40% profitability, 20% stability.
    pub const DEFAULT: Self = Self {
        tx_success: 0.40,
        x402_profitability: 0.40,
        erc8004_stability: 0.20,
    };

    /// Validate and build a weight set.
    ///
    /// Fails with [`Error::Configuration`] carrying the computed sum when the
    /// weights do not add up to 1.0, and with [`Error::InvalidWeight`] for a
    /// negative or non-finite component.
    pub fn new(tx_success: f64, x402_profitability: f64, erc8004_stability: f64) -> Result<Self> {
        for (name, value) in [
            ("tx_success", tx_success),
            ("x402_profitability", x402_profitability),
            ("erc8004_stability", erc8004_stability),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidWeight { name, value });
            }
        }

        let sum = tx_success + x402_profitability + erc8004_stability;
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::Configuration { sum });
        }

        Ok(Self {
            tx_success,
            x402_profitability,
            erc8004_stability,
        })
    }

    pub fn tx_success(&self) -> f64 {
        self.tx_success
    }

    pub fn x402_profitability(&self) -> f64 {
        self.x402_profitability
    }

    pub fn erc8004_stability(&self) -> f64 {
        self.erc8004_stability
    }

    pub fn sum(&self) -> f64 {
        self.tx_success + self.x402_profitability + self.erc8004_stability
    }
}

impl Default for WeightSet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = WeightSet::default();
        assert!((weights.sum() - 1.0).abs() < WEIGHT_TOLERANCE);
        assert_eq!(weights.tx_success(), 0.40);
        assert_eq!(weights.x402_profitability(), 0.40);
        assert_eq!(weights.erc8004_stability(), 0.20);
    }

    #[test]
    fn test_rejects_sum_outside_tolerance() {
        let err = WeightSet::new(0.5, 0.5, 0.5).unwrap_err();
        match err {
            Error::Configuration { sum } => assert!((sum - 1.5).abs() < 1e-9),
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(WeightSet::new(0.4, 0.4, 0.1).is_err());
    }

    #[test]
    fn test_accepts_sum_within_tolerance() {
        assert!(WeightSet::new(0.4, 0.4, 0.2005).is_ok());
        assert!(WeightSet::new(0.3334, 0.3333, 0.3333).is_ok());
        assert!(WeightSet::new(1.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        assert!(matches!(
            WeightSet::new(-0.2, 0.8, 0.4),
            Err(Error::InvalidWeight { name: "tx_success", .. })
        ));
        assert!(matches!(
            WeightSet::new(0.4, f64::NAN, 0.2),
            Err(Error::InvalidWeight { name: "x402_profitability", .. })
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: WeightSet = serde_json::from_str(
            r#"{"tx_success":0.5,"x402_profitability":0.3,"erc8004_stability":0.2}"#,
        )
        .unwrap();
        assert_eq!(ok.tx_success(), 0.5);

        let bad = serde_json::from_str::<WeightSet>(
            r#"{"tx_success":0.5,"x402_profitability":0.5,"erc8004_stability":0.2}"#,
        );
        assert!(bad.is_err());
    }
}
