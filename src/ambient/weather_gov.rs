//! weather.gov hourly forecast client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::{AmbientDataService, AmbientLocation};
use crate::config::AmbientConfig;
use crate::error::ServiceError;
use crate::utils::helpers::fahrenheit_to_celsius;

/// Hourly forecast in `application/ld+json` form
#[derive(Debug, Deserialize)]
pub struct HourlyForecast {
    #[serde(default)]
    pub periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub temperature: f64,
    #[serde(default = "default_unit")]
    pub temperature_unit: String,
}

fn default_unit() -> String {
    "F".to_string()
}

impl HourlyForecast {
    /// Current-hour temperature in Celsius
    pub fn current_celsius(&self) -> Result<i64, ServiceError> {
        let period = self
            .periods
            .first()
            .ok_or_else(|| ServiceError::Payload("forecast has no periods".to_string()))?;

        match period.temperature_unit.as_str() {
            "F" => Ok(fahrenheit_to_celsius(period.temperature)),
            "C" => Ok(period.temperature as i64),
            other => Err(ServiceError::Payload(format!(
                "unknown temperature unit '{}'",
                other
            ))),
        }
    }
}

pub struct WeatherGovClient {
    api_url: String,
    user_agent: String,
    client: reqwest::Client,
}

impl WeatherGovClient {
    pub fn new(config: &AmbientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("Failed to build weather HTTP client")?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            client,
        })
    }

    pub fn forecast_url(&self, location: &AmbientLocation) -> String {
        format!(
            "{}/points/{:.4},{:.4}/forecast/hourly",
            self.api_url, location.latitude, location.longitude
        )
    }
}

#[async_trait]
impl AmbientDataService for WeatherGovClient {
    async fn ambient(&self, location: &AmbientLocation) -> Result<i64, ServiceError> {
        let url = self.forecast_url(location);
        debug!("Fetching hourly forecast from {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/ld+json")
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        let forecast: HourlyForecast = response.json().await?;
        let celsius = forecast.current_celsius()?;
        info!("{} temperature is {} Celsius", location.name, celsius);
        Ok(celsius)
    }
}
