//! Common types used throughout the application

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator-chosen temperature bound, fixed for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub celsius: i64,
}

impl ThresholdConfig {
    pub const DEFAULT_CELSIUS: i64 = 46;

    pub fn new(celsius: i64) -> Self {
        Self { celsius }
    }

    /// Strict crossing test: a reading equal to the threshold does not escalate.
    pub fn is_exceeded_by(&self, reading: i64) -> bool {
        reading > self.celsius
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CELSIUS)
    }
}

/// Health state as reported by the device, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorHealth(String);

impl SensorHealth {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_normal(&self) -> bool {
        self.0.eq_ignore_ascii_case("normal")
    }
}

impl fmt::Display for SensorHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One poll tick's sensor reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSample {
    /// Celsius
    pub reading: i64,
    pub health: SensorHealth,
}

impl SensorSample {
    pub fn new(reading: i64, health: impl Into<String>) -> Self {
        Self {
            reading,
            health: SensorHealth::new(health),
        }
    }
}

/// An operationally-up interface and its IPv4 address, if configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub ip: Option<String>,
}

impl InterfaceInfo {
    pub fn new(name: impl Into<String>, ip: Option<String>) -> Self {
        Self { name: name.into(), ip }
    }
}

/// Device identity and interfaces, collected once after a crossing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub hostname: String,
    /// Every up interface in device order, including those without an address.
    pub interfaces: Vec<InterfaceInfo>,
}

impl DeviceSnapshot {
    pub fn new(hostname: impl Into<String>, interfaces: Vec<InterfaceInfo>) -> Self {
        Self {
            hostname: hostname.into(),
            interfaces,
        }
    }

    pub fn up_interface_count(&self) -> usize {
        self.interfaces.len()
    }

    /// Rows for the reported address table
    pub fn addressed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.interfaces
            .iter()
            .filter_map(|intf| intf.ip.as_deref().map(|ip| (intf.name.as_str(), ip)))
    }
}

/// Outdoor temperature for the configured site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbientReading {
    Celsius(i64),
    /// Substituted when the ambient service fails and the run is set to continue.
    Unknown,
}

impl fmt::Display for AmbientReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmbientReading::Celsius(c) => write!(f, "{}", c),
            AmbientReading::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        let threshold = ThresholdConfig::default();
        assert_eq!(threshold.celsius, 46);
        assert!(!threshold.is_exceeded_by(46));
        assert!(threshold.is_exceeded_by(47));
    }

    #[test]
    fn test_snapshot_keeps_raw_count() {
        let snapshot = DeviceSnapshot::new(
            "sw1",
            vec![
                InterfaceInfo::new("Gi1/0/1", Some("10.1.1.1".to_string())),
                InterfaceInfo::new("Gi1/0/2", None),
            ],
        );
        assert_eq!(snapshot.up_interface_count(), 2);
        let rows: Vec<_> = snapshot.addressed().collect();
        assert_eq!(rows, vec![("Gi1/0/1", "10.1.1.1")]);
    }

    #[test]
    fn test_health_passthrough() {
        let health = SensorHealth::new("GREEN");
        assert_eq!(health.to_string(), "GREEN");
        assert!(!health.is_normal());
        assert!(SensorHealth::new("Normal").is_normal());
    }
}
