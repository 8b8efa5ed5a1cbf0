//! Risk tier classification.

use serde::{Deserialize, Serialize};

/// Risk tier (1: lowest risk ~ 5: highest risk), ordered best to worst.
///
/// Serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RiskTier {
    /// 850+
    Excellent = 1,
    /// 750-849
    Good = 2,
    /// 650-749
    Average = 3,
    /// 550-649
    BelowAverage = 4,
    /// <550
    Poor = 5,
}

impl RiskTier {
    pub const EXCELLENT_MIN: u32 = 850;
    pub const GOOD_MIN: u32 = 750;
    pub const AVERAGE_MIN: u32 = 650;
    pub const BELOW_AVERAGE_MIN: u32 = 550;

    /// Classify an overall score. Each lower bound is inclusive.
    pub fn from_score(overall: u32) -> Self {
        if overall >= Self::EXCELLENT_MIN {
            Self::Excellent
        } else if overall >= Self::GOOD_MIN {
            Self::Good
        } else if overall >= Self::AVERAGE_MIN {
            Self::Average
        } else if overall >= Self::BELOW_AVERAGE_MIN {
            Self::BelowAverage
        } else {
            Self::Poor
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Average => "average",
            Self::BelowAverage => "below_average",
            Self::Poor => "poor",
        }
    }
}

impl From<RiskTier> for u8 {
    fn from(tier: RiskTier) -> Self {
        tier.code()
    }
}

impl TryFrom<u8> for RiskTier {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Excellent),
            2 => Ok(Self::Good),
            3 => Ok(Self::Average),
            4 => Ok(Self::BelowAverage),
            5 => Ok(Self::Poor),
            other => Err(format!("invalid risk tier code: {other}")),
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
