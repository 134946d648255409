//! Error types for the monitor pipeline
//!
//! Fatal kinds (`QueryError`, `ParseError`, `ServiceError`) abort a run and are
//! folded into [`MonitorError`]. `ChannelError` never leaves the dispatcher.

use thiserror::Error;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Transport or protocol failure talking to the device
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("transport error for filter '{filter}': {source}")]
    Transport {
        filter: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("device returned HTTP {status} for filter '{filter}'")]
    Status { filter: &'static str, status: u16 },

    #[error("undecodable response for filter '{filter}': {message}")]
    Decode { filter: &'static str, message: String },

    #[error("invalid request for filter '{filter}': {message}")]
    Request { filter: &'static str, message: String },
}

/// Expected data missing or unusable in a successful response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("field '{field}' missing from '{filter}' response")]
    MissingField { filter: &'static str, field: &'static str },

    #[error("field '{field}' is empty in '{filter}' response")]
    EmptyField { filter: &'static str, field: &'static str },

    #[error("field '{field}' in '{filter}' response is malformed: {detail}")]
    Malformed {
        filter: &'static str,
        field: &'static str,
        detail: String,
    },
}

/// Ambient data service failure
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("ambient service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ambient service returned HTTP {0}")]
    Status(u16),

    #[error("ambient service response unusable: {0}")]
    Payload(String),
}

/// Notification delivery failure, recovered by the dispatcher
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification endpoint returned HTTP {0}")]
    Status(u16),

    #[error("notification channel misconfigured: {0}")]
    Config(String),
}

/// Fatal errors that end a monitoring run before DONE
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Device query failed: {0}")]
    Query(#[from] QueryError),

    #[error("Device response parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Ambient reading failed: {0}")]
    Ambient(#[from] ServiceError),

    #[error("State error: {message}")]
    State { message: String },
}

impl MonitorError {
    pub fn state(message: impl Into<String>) -> Self {
        Self::State { message: message.into() }
    }
}
