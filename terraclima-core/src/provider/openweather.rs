use anyhow::{Context, Result, anyhow};
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

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// OpenWeatherMap-backed strategy. Without an API key, or whenever the API
/// call fails, it answers with a coordinate-seeded synthetic reading.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
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
        let url = format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'));
        let lat = query.location.latitude.to_string();
        let lon = query.location.longitude.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", api_key),
                ("units", "metric"),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        Ok(build_reading(
            parsed.main.humidity,
            query,
            Conditions {
                temperature: Some(parsed.main.temp),
                pressure: Some(parsed.main.pressure),
                wind_speed: Some(parsed.wind.map_or(0.0, |w| w.speed)),
            },
        ))
    }

    fn synthetic_reading(&self, query: &WeatherQuery) -> HumidityReading {
        let (humidity, conditions) = synthetic_conditions(&mut rand::thread_rng(), query.location);
        build_reading(humidity, query, conditions)
    }
}

/// humidity = clamp(5, 95, 30 + 20 sin(lat) + 15 cos(lon) + U(0, 20))
pub(crate) fn synthetic_conditions<R: Rng + ?Sized>(
    rng: &mut R,
    at: Coordinate,
) -> (f64, Conditions) {
    let base = 30.0 + at.latitude.sin() * 20.0 + at.longitude.cos() * 15.0;
    let humidity = (base + rng.gen_range(0.0..20.0)).clamp(5.0, 95.0);

    let conditions = Conditions {
        temperature: Some(25.0 + rng.gen_range(0.0..20.0)),
        pressure: Some(1013.0 + rng.gen_range(0.0..50.0)),
        wind_speed: Some(rng.gen_range(0.0..15.0)),
    };

    (humidity, conditions)
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    wind: Option<OwWind>,
}

#[async_trait]
impl HumidityProvider for OpenWeatherProvider {
    fn name(&self) -> &'static str {
        ProviderId::OpenWeather.label()
    }

    async fn get_humidity(&self, query: &WeatherQuery) -> Result<HumidityReading> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("OpenWeather API key not configured, using synthetic data");
            return Ok(self.synthetic_reading(query));
        };

        match self.fetch_current(api_key, query).await {
            Ok(reading) => Ok(reading),
            Err(err) => {
                warn!(
                    error = %format!("{err:#}"),
                    "OpenWeather request failed, falling back to synthetic data"
                );
                Ok(self.synthetic_reading(query))
            }
        }
    }
}
