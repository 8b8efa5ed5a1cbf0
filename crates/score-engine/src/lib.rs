//! Score Engine
//!
//! Fans out to the score sources, aggregates the weighted sub-scores into a
//! 0-1000 overall score, runs anti-gaming adjustments and classifies risk.

pub mod aggregate;
pub mod calculator;
pub mod record;

pub use aggregate::{calculate_from_subscores, estimate_confidence, risk_tier};
pub use calculator::{ScoreCalculator, ScoreSources};
pub use record::{ScoreBreakdown, ScoreRecord, SourceBreakdown};
