//! Shared types and helpers

pub mod helpers;
pub mod types;

pub use types::{
    AmbientReading, DeviceSnapshot, InterfaceInfo, SensorHealth, SensorSample, ThresholdConfig,
};
