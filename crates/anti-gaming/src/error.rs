//! Anti-gaming error types.

use thiserror::Error;

/// Failure inside the adjustment chain.
///
/// These never reach score consumers: the calculator falls back to the
/// unadjusted score when it sees one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdjustmentError {
    #[error("Invalid anti-gaming input: {0}")]
    InvalidInput(String),

    #[error("Invalid anti-gaming configuration: {0}")]
    InvalidConfig(String),

    #[error("Anti-gaming stage {stage} failed: {message}")]
    Stage {
        stage: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, AdjustmentError>;
