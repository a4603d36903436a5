//! Backtesting module

pub mod metrics;
pub mod report;
pub mod simulator;

pub use metrics::*;
pub use report::*;
pub use simulator::*;
