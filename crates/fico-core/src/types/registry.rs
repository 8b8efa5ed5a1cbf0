//! ERC-8004 agent registry profile.

use serde::{Deserialize, Serialize};

/// Verification level granted by the registry. Higher is more thorough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum VerificationLevel {
    Unverified = 0,
    Basic = 1,
    Standard = 2,
    Advanced = 3,
    Premium = 4,
    Enterprise = 5,
}

impl VerificationLevel {
    /// Map any byte onto a level, wrapping modulo 6.
    pub fn from_byte(byte: u8) -> Self {
        match byte % 6 {
            0 => Self::Unverified,
            1 => Self::Basic,
            2 => Self::Standard,
            3 => Self::Advanced,
            4 => Self::Premium,
            _ => Self::Enterprise,
        }
    }
}

impl From<VerificationLevel> for u8 {
    fn from(level: VerificationLevel) -> Self {
        level as u8
    }
}

impl TryFrom<u8> for VerificationLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 5 {
            return Err(format!("invalid verification level: {value}"));
        }
        Ok(Self::from_byte(value))
    }
}

/// Registry data for a registered agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryProfile {
    pub name: String,
    pub verification_level: VerificationLevel,
    /// Days since registration.
    pub activity_days: u32,
    /// Percentage of metadata fields filled (0-100).
    pub metadata_completeness: f64,
    /// Community reputation (0-5).
    pub reputation_score: f64,
}
