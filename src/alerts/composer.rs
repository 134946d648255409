//! Alert text composition
//!
//! Pure and deterministic: same inputs, same strings, no I/O.

use std::fmt::Write as _;

use crate::utils::types::{AmbientReading, DeviceSnapshot, SensorSample};

pub struct AlertComposer {
    /// Outdoor location label, e.g. "Lake Oswego, OR"
    location_name: String,
}

impl AlertComposer {
    pub fn new(location_name: impl Into<String>) -> Self {
        Self {
            location_name: location_name.into(),
        }
    }

    /// Messages in dispatch order: summary, interface addresses, end sentinel.
    pub fn compose(
        &self,
        hostname: &str,
        sample: &SensorSample,
        ambient: &AmbientReading,
        snapshot: &DeviceSnapshot,
    ) -> Vec<String> {
        vec![
            self.summary(hostname, sample, ambient),
            interfaces_line(hostname, snapshot),
            sentinel(hostname),
        ]
    }

    pub fn summary(&self, hostname: &str, sample: &SensorSample, ambient: &AmbientReading) -> String {
        format!(
            "{} ALERT: inlet air temp (in Celsius): {}, state: {}, {}, temp (in Celsius): {}",
            hostname, sample.reading, sample.health, self.location_name, ambient
        )
    }
}

pub fn interfaces_line(hostname: &str, snapshot: &DeviceSnapshot) -> String {
    let rows: Vec<String> = snapshot
        .addressed()
        .map(|(name, ip)| format!("{} {}", name, ip))
        .collect();

    if rows.is_empty() {
        format!("{} intf up IP add:", hostname)
    } else {
        format!("{} intf up IP add: {}", hostname, rows.join(", "))
    }
}

pub fn sentinel(hostname: &str) -> String {
    format!("{} end of alert", hostname)
}

/// Fixed-width interface/address table for the local log
pub fn interface_table(snapshot: &DeviceSnapshot) -> String {
    let mut table = format!(" {:25} {:20}", "Interface", "IP Address");
    for (name, ip) in snapshot.addressed() {
        let _ = write!(table, "\n {:25} {:20}", name, ip);
    }
    table
}
