use thiserror::Error;

pub type Result<T> = std::result::Result<T, BacktestError>;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error(transparent)]
    Weights(#[from] fico_core::Error),

    #[error("no weight variations to compare")]
    NoVariations,
}
