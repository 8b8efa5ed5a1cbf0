//! AgentFICO: composite credit scores for on-chain agents.
//!
//! The root crate hosts the `agent-fico` binary, the benchmarks and the
//! cross-crate integration tests. Functionality lives in the member crates:
//!
//! - `fico-core`: weights, score types, normalizers, configuration
//! - `data-sources`: source interfaces, no-data and mock implementations
//! - `anti-gaming`: time decay, anomaly, consistency and tx quality stages
//! - `score-engine`: aggregation, risk tiers, confidence, the calculator
//! - `backtester`: sample agents, weight backtests and sensitivity reports

pub use anti_gaming as adjust;
pub use backtester as backtest;
pub use data_sources as sources;
pub use fico_core as core;
pub use score_engine as engine;
