//! Device Query Module
//!
//! The switch is reached through a structured query service:
//! - `QueryFilter` names the subtree being requested
//! - `Document` holds the decoded response tree
//! - `RestconfClient` is the HTTPS implementation
//! - `TelemetryExtractor` turns documents into typed values

pub mod document;
pub mod extractor;
pub mod restconf;

pub use document::Document;
pub use extractor::TelemetryExtractor;
pub use restconf::RestconfClient;

use async_trait::async_trait;
use std::fmt;

use crate::error::QueryError;

/// Symbolic filters understood by the device query service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryFilter {
    /// Configured hostname
    Hostname,
    /// Operational state of all interfaces, used to select those that are up
    InterfacesUp,
    /// Configuration of one named interface
    Interface(String),
    /// One named environment sensor
    Sensor(String),
}

impl QueryFilter {
    /// Stable name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            QueryFilter::Hostname => "hostname",
            QueryFilter::InterfacesUp => "interfaces-oper-up",
            QueryFilter::Interface(_) => "interface",
            QueryFilter::Sensor(_) => "environment-sensor",
        }
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryFilter::Interface(name) | QueryFilter::Sensor(name) => {
                write!(f, "{}[{}]", self.name(), name)
            }
            _ => f.write_str(self.name()),
        }
    }
}

/// One query per call; implementations must not hold a session between calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceQueryService: Send + Sync {
    async fn query(&self, filter: &QueryFilter) -> Result<Document, QueryError>;
}
