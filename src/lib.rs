//! Switch Thermal Monitor Library
//!
//! Watches a switch's inlet temperature sensor and, once a reading exceeds the
//! operator's threshold, posts a one-shot alert with the device snapshot.

pub mod alerts;
pub mod ambient;
pub mod config;
pub mod device;
pub mod error;
pub mod monitor;
pub mod telemetry;
pub mod utils;

// Re-export main types
pub use config::AppConfig;
pub use error::{MonitorError, ParseError, QueryError};
pub use monitor::{MonitorSettings, MonitorState, RunReport, ThresholdMonitor};
