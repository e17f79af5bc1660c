use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{error::HumidityError, provider::ProviderId, severity::SeverityTier};

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A validated humidity request.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub location: Coordinate,
    pub date: NaiveDate,
    pub provider: ProviderId,
}

impl WeatherQuery {
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Auxiliary readings a provider may attach next to humidity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Conditions {
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumidityReading {
    /// Requested day, always normalized to `YYYY-MM-DD` even when the request
    /// carried a full RFC 3339 timestamp.
    pub date: String,
    /// Relative humidity in percent, rounded to two decimals.
    pub humidity: f64,
    pub message: String,
    pub level: SeverityTier,
    pub color: String,
    pub location: Coordinate,
    pub provider: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
}

/// Uniform success/error wrapper returned by the weather service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HumidityReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultEnvelope {
    pub fn ok(data: HumidityReading) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl From<Result<HumidityReading, HumidityError>> for ResultEnvelope {
    fn from(result: Result<HumidityReading, HumidityError>) -> Self {
        match result {
            Ok(reading) => Self::ok(reading),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}
