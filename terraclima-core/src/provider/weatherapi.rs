use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    model::{Conditions, Coordinate, HumidityReading, WeatherQuery},
    provider::{build_reading, truncate_body},
};

use super::{HumidityProvider, ProviderId};

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com";

/// WeatherAPI.com-backed strategy with the same fallback policy as
/// [`super::openweather::OpenWeatherProvider`].
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(http: Client, api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn fetch_current(&self, api_key: &str, query: &WeatherQuery) -> Result<HumidityReading> {
        let url = format!("{}/v1/current.json", self.base_url.trim_end_matches('/'));
        let q = format!("{},{}", query.location.latitude, query.location.longitude);

        let res = self
            .http
            .get(&url)
            .query(&[("key", api_key), ("q", q.as_str()), ("aqi", "no")])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (current)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read WeatherAPI current response body")?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: WaResponse =
            serde_json::from_str(&body).context("Failed to parse WeatherAPI current JSON")?;

        let wind_speed_mps = parsed.current.wind_kph / 3.6;

        Ok(build_reading(
            parsed.current.humidity,
            query,
            Conditions {
                temperature: Some(parsed.current.temp_c),
                pressure: Some(parsed.current.pressure_mb),
                wind_speed: Some(wind_speed_mps),
            },
        ))
    }

    fn synthetic_reading(&self, query: &WeatherQuery) -> HumidityReading {
        let (humidity, conditions) = synthetic_conditions(&mut rand::thread_rng(), query.location);
        build_reading(humidity, query, conditions)
    }
}

/// humidity = clamp(10, 90, 40 + 25 sin(lon) + 10 cos(lat) + U(0, 15))
pub(crate) fn synthetic_conditions<R: Rng + ?Sized>(
    rng: &mut R,
    at: Coordinate,
) -> (f64, Conditions) {
    let base = 40.0 + at.longitude.sin() * 25.0 + at.latitude.cos() * 10.0;
    let humidity = (base + rng.gen_range(0.0..15.0)).clamp(10.0, 90.0);

    let conditions = Conditions {
        temperature: Some(20.0 + rng.gen_range(0.0..25.0)),
        pressure: Some(1008.0 + rng.gen_range(0.0..40.0)),
        wind_speed: Some(rng.gen_range(0.0..12.0)),
    };

    (humidity, conditions)
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: f64,
    pressure_mb: f64,
    wind_kph: f64,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
}

#[async_trait]
impl HumidityProvider for WeatherApiProvider {
    fn name(&self) -> &'static str {
        ProviderId::WeatherApi.label()
    }

    async fn get_humidity(&self, query: &WeatherQuery) -> Result<HumidityReading> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("WeatherAPI key not configured, using synthetic data");
            return Ok(self.synthetic_reading(query));
        };

        match self.fetch_current(api_key, query).await {
            Ok(reading) => Ok(reading),
            Err(err) => {
                warn!(
                    error = %format!("{err:#}"),
                    "WeatherAPI request failed, falling back to synthetic data"
                );
                Ok(self.synthetic_reading(query))
            }
        }
    }
}
