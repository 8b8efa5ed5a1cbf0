//! Backtester
//!
//! Checks how well a weighting reproduces the risk tiers of a fixed set of
//! sample agents.
//!
//! # Features
//!
//! - **Sample Agents**: Eight reference profiles with their expected tiers
//! - **Backtest Runner**: Accuracy, tier distribution and score spread for a weighting
//! - **Weight Sensitivity**: Compares weightings and recommends the most accurate
//! - **Report**: Markdown summary of a run
//!
//! # Example
//!
//! ```ignore
//! use backtester::{sample_agents, BacktestRunner};
//!
//! let runner = BacktestRunner::default();
//! let summary = runner.run_backtest(&sample_agents());
//! println!("Accuracy: {:.1}%", summary.accuracy * 100.0);
//! ```

pub mod agents;
pub mod error;
pub mod report;
pub mod runner;

// Re-exports
pub use agents::{agents_by_tier, custom_agent, sample_agents, SampleAgent};
pub use error::{BacktestError, Result};
pub use report::generate_report;
pub use runner::{
    default_weight_variations, BacktestResult, BacktestRunner, BacktestSummary,
    SensitivityAnalysis, VariationResult,
};
