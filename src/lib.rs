//! Aurum - technical signal and alert monitor for a single instrument

pub mod config;
pub mod delivery;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use services::{AlertStateMachine, IndicatorEngine, Monitor, ReportScheduler, SignalAggregator};
pub use types::*;
