//! Ambient Data Module
//!
//! Fetches the outdoor temperature for the site the switch lives in.

pub mod weather_gov;

pub use weather_gov::WeatherGovClient;

use async_trait::async_trait;

use crate::config::AmbientConfig;
use crate::error::ServiceError;

/// Fixed outdoor location for a monitoring run
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&AmbientConfig> for AmbientLocation {
    fn from(config: &AmbientConfig) -> Self {
        Self {
            name: config.location_name.clone(),
            latitude: config.latitude,
            longitude: config.longitude,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AmbientDataService: Send + Sync {
    /// Current outdoor temperature in whole degrees Celsius
    async fn ambient(&self, location: &AmbientLocation) -> Result<i64, ServiceError>;
}
