//! Anti-gaming corrections for AgentFICO scores.
//!
//! Four independently flagged stages:
//! - Time decay (recent activity weighs more)
//! - Anomaly penalty (abrupt changes are suspicious)
//! - Consistency bonus (rewards sustained performance)
//! - Transaction quality (dust and self-transfers count for little)

pub mod anomaly;
pub mod chain;
pub mod config;
pub mod consistency;
pub mod error;
pub mod time_decay;
pub mod tx_quality;

pub use chain::{
    finalize_score, run_chain, AdjustmentChain, AdjustmentEffect, AdjustmentEntry, AdjustmentStep,
    AdjustmentTrail, AntiGamingChain, NoopChain,
};
pub use config::{AntiGamingConfig, CoefficientStore, FeatureFlags};
pub use error::{AdjustmentError, Result};
