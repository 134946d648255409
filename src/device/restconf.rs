//! RESTCONF Device Client
//!
//! Implements the device query service over HTTPS using the YANG JSON
//! encoding. Every query is a single request on its own connection; nothing
//! is cached and no connection outlives the call.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use super::{DeviceQueryService, Document, QueryFilter};
use crate::config::DeviceConfig;
use crate::error::QueryError;

const YANG_JSON: &str = "application/yang-data+json";

/// RESTCONF client bound to one device and one set of credentials
pub struct RestconfClient {
    /// `https://{address}:{port}/restconf/data`
    base: Url,
    username: String,
    password: String,
    client: reqwest::Client,
}

impl RestconfClient {
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        let base = Url::parse(&format!(
            "https://{}:{}/restconf/data",
            config.address, config.port
        ))
        .with_context(|| format!("Invalid device address: {}", config.address))?;

        let client = http_client(config).context("Failed to build device HTTP client")?;

        info!("RESTCONF client targeting {}", base);

        Ok(Self {
            base,
            username: config.username.clone(),
            password: config.password.clone().unwrap_or_default(),
            client,
        })
    }

    /// Resource URL for a filter; list keys are percent-encoded as one path segment.
    pub fn url_for(&self, filter: &QueryFilter) -> Result<Url, QueryError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| QueryError::Request {
                filter: filter.name(),
                message: "device URL cannot carry a path".to_string(),
            })?;

            match filter {
                QueryFilter::Hostname => {
                    segments.extend(["Cisco-IOS-XE-native:native", "hostname"]);
                }
                QueryFilter::InterfacesUp => {
                    segments.push("ietf-interfaces:interfaces-state");
                }
                QueryFilter::Interface(name) => {
                    segments
                        .push("ietf-interfaces:interfaces")
                        .push(&format!("interface={}", name.trim()));
                }
                // Sensor list is keyed by name and location; fetch the container and
                // let the extractor select the entry by name.
                QueryFilter::Sensor(_) => {
                    segments.push("Cisco-IOS-XE-environment-oper:environment-sensors");
                }
            }
        }
        Ok(url)
    }
}

/// Idle connections are never pooled, so each query opens and closes its own.
fn http_client(config: &DeviceConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .pool_max_idle_per_host(0)
        .build()
}

/// Map a RESTCONF reply to a document. 404 and 204 mean the node is absent.
pub fn decode_response(filter: &QueryFilter, status: StatusCode, body: &str) -> Result<Document, QueryError> {
    if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
        return Ok(Document::empty());
    }
    if !status.is_success() {
        return Err(QueryError::Status {
            filter: filter.name(),
            status: status.as_u16(),
        });
    }
    if body.trim().is_empty() {
        return Ok(Document::empty());
    }

    serde_json::from_str::<Value>(body)
        .map(Document::from)
        .map_err(|e| QueryError::Decode {
            filter: filter.name(),
            message: e.to_string(),
        })
}

#[async_trait]
impl DeviceQueryService for RestconfClient {
    async fn query(&self, filter: &QueryFilter) -> Result<Document, QueryError> {
        let url = self.url_for(filter)?;
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, YANG_JSON)
            .send()
            .await
            .map_err(|source| QueryError::Transport {
                filter: filter.name(),
                source,
            })?;

        let status = response.status();
        debug!("RESTCONF {} -> {} in {:?}", filter, status, start.elapsed());

        let body = response.text().await.map_err(|source| QueryError::Transport {
            filter: filter.name(),
            source,
        })?;
        decode_response(filter, status, &body)
    }
}
