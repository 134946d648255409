//! Configuration module
//!
//! Handles loading and validation of the application configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable that overrides `device.password`
pub const DEVICE_PASSWORD_ENV: &str = "STM_DEVICE_PASSWORD";
/// Environment variable that overrides `notification.webex.token`
pub const WEBEX_TOKEN_ENV: &str = "STM_WEBEX_TOKEN";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub device: DeviceConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    pub ambient: AmbientConfig,
    pub notification: NotificationConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        info!("Configuration loaded from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).with_context(|| "Failed to parse config file")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(password) = std::env::var(DEVICE_PASSWORD_ENV) {
            self.device.password = Some(password);
        }
        if let Ok(token) = std::env::var(WEBEX_TOKEN_ENV) {
            self.notification.webex.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.device.address.is_empty(), "device.address must be set");
        anyhow::ensure!(!self.device.username.is_empty(), "device.username must be set");
        anyhow::ensure!(
            self.device.password.as_deref().is_some_and(|p| !p.is_empty()),
            "device.password must be set (or {})",
            DEVICE_PASSWORD_ENV
        );
        anyhow::ensure!(!self.monitor.sensor.is_empty(), "monitor.sensor must be set");
        anyhow::ensure!(
            self.monitor.poll_interval_secs > 0,
            "monitor.poll_interval_secs must be positive"
        );
        anyhow::ensure!(
            (-90.0..=90.0).contains(&self.ambient.latitude),
            "ambient.latitude must be between -90 and 90"
        );
        anyhow::ensure!(
            (-180.0..=180.0).contains(&self.ambient.longitude),
            "ambient.longitude must be between -180 and 180"
        );

        match self.notification.channel {
            ChannelKind::Webex => {
                let webex = &self.notification.webex;
                anyhow::ensure!(
                    webex.token.as_deref().is_some_and(|t| !t.is_empty()),
                    "notification.webex.token must be set (or {})",
                    WEBEX_TOKEN_ENV
                );
                anyhow::ensure!(
                    webex.room_id.is_some() || webex.room_title.is_some(),
                    "notification.webex needs room_id or room_title"
                );
            }
            ChannelKind::Webhook => {
                anyhow::ensure!(
                    self.notification.webhook_url.is_some(),
                    "notification.webhook_url must be set for the webhook channel"
                );
            }
            ChannelKind::Log => {}
        }
        Ok(())
    }

    /// Create a default config for testing
    #[cfg(test)]
    pub fn default_for_test() -> Self {
        Self {
            device: DeviceConfig {
                address: "10.93.130.45".to_string(),
                port: 443,
                username: "cisco".to_string(),
                password: Some("cisco".to_string()),
                accept_invalid_certs: true,
                request_timeout_ms: 10000,
            },
            monitor: MonitorConfig::default(),
            ambient: AmbientConfig {
                location_name: "Lake Oswego, OR".to_string(),
                latitude: 45.4176,
                longitude: -122.7331,
                api_url: default_weather_api_url(),
                user_agent: default_user_agent(),
                request_timeout_ms: 10000,
                on_failure: AmbientFailurePolicy::Abort,
            },
            notification: NotificationConfig {
                channel: ChannelKind::Log,
                webex: WebexConfig::default(),
                webhook_url: None,
                request_timeout_ms: 10000,
            },
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Managed switch reachable over RESTCONF
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub address: String,
    #[serde(default = "default_device_port")]
    pub port: u16,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Lab switches usually present self-signed certificates
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_device_port() -> u16 { 443 }
fn default_request_timeout() -> u64 { 10000 }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Environment sensor name, e.g. "Temp Sensor 0" (inlet)
    #[serde(default = "default_sensor")]
    pub sensor: String,
    #[serde(default = "default_threshold")]
    pub default_threshold: i64,
    #[serde(default = "default_prompt_wait")]
    pub prompt_wait_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_sensor() -> String { "Temp Sensor 0".to_string() }
fn default_threshold() -> i64 { 46 }
fn default_prompt_wait() -> u64 { 10 }
fn default_poll_interval() -> u64 { 10 }

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sensor: default_sensor(),
            default_threshold: default_threshold(),
            prompt_wait_secs: default_prompt_wait(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

/// What to do when the outdoor reading cannot be fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientFailurePolicy {
    /// Abort the run
    #[default]
    Abort,
    /// Continue with an "unknown" reading
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientConfig {
    /// Label used in alert text
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_weather_api_url")]
    pub api_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub on_failure: AmbientFailurePolicy,
}

fn default_weather_api_url() -> String { "https://api.weather.gov".to_string() }
fn default_user_agent() -> String {
    format!("switch-thermal-monitor/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Webex,
    Webhook,
    #[default]
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub channel: ChannelKind,
    #[serde(default)]
    pub webex: WebexConfig,
    pub webhook_url: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebexConfig {
    #[serde(default = "default_webex_api_url")]
    pub api_url: String,
    pub token: Option<String>,
    pub room_id: Option<String>,
    /// Resolved to a room id once at startup when `room_id` is absent
    pub room_title: Option<String>,
}

fn default_webex_api_url() -> String { "https://webexapis.com/v1".to_string() }

impl Default for WebexConfig {
    fn default() -> Self {
        Self {
            api_url: default_webex_api_url(),
            token: None,
            room_id: None,
            room_title: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
    pub log_file: Option<String>,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    #[serde(default)]
    pub enable_metrics: bool,
}

fn default_log_level() -> String { "info".to_string() }
fn default_metrics_port() -> u16 { 9090 }

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            log_file: None,
            metrics_port: default_metrics_port(),
            enable_metrics: false,
        }
    }
}
