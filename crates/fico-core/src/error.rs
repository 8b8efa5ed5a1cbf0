//! Error types for the AgentFICO scoring system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Weights must sum to 1.0, got {sum}")]
    Configuration { sum: f64 },

    #[error("Invalid weight for {name}: {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Data source error ({source_name}): {message}")]
    Source {
        source_name: &'static str,
        message: String,
    },
}

impl Error {
    pub fn upstream(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::Source {
            source_name,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
