//! AgentFICO Core Library
//!
//! Shared score types, weight validation and the sub-score normalizers used
//! by the data sources and the score engine.

pub mod config;
pub mod error;
pub mod normalize;
pub mod types;
pub mod weights;

pub use error::{Error, Result};
pub use weights::WeightSet;
