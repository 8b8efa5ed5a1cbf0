//! Data sources for AgentFICO.
//!
//! Interfaces for the three score components and the anti-gaming activity
//! feed, with no-data and deterministic mock implementations.

pub mod mock;
pub mod nodata;
pub mod source;
pub mod summary;

pub use mock::{
    MockActivitySource, MockLedger, MockProfitabilitySource, MockStabilitySource,
    MockTxSuccessSource,
};
pub use nodata::{
    NoDataActivitySource, NoDataProfitabilitySource, NoDataStabilitySource, NoDataTxSuccessSource,
};
pub use source::{ActivitySource, ProfitabilitySource, StabilitySource, TxSuccessSource};
pub use summary::{Payment, PaymentDirection};
