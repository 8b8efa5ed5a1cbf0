//! Core domain types for the AgentFICO scoring system.

pub mod activity;
pub mod registry;
pub mod source;
pub mod tier;

pub use activity::*;
pub use registry::*;
pub use source::*;
pub use tier::*;
