use crate::{
    Config, HumidityError, HumidityReading, WeatherQuery,
    model::Conditions,
    provider::{
        mockdata::MockDataProvider, openweather::OpenWeatherProvider,
        weatherapi::WeatherApiProvider,
    },
    severity::{SeverityTier, round_hundredths, survival_message},
};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod mockdata;
pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
    MockData,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
            ProviderId::MockData => "mockdata",
        }
    }

    /// Display label shown next to the id in provider pickers.
    pub const fn label(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OpenWeatherMap",
            ProviderId::WeatherApi => "WeatherAPI",
            ProviderId::MockData => "Simulated Post-Collapse Data",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[
            ProviderId::OpenWeather,
            ProviderId::WeatherApi,
            ProviderId::MockData,
        ]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = HumidityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            "mockdata" => Ok(ProviderId::MockData),
            _ => Err(HumidityError::UnsupportedProvider(value.to_string())),
        }
    }
}

/// A source of humidity readings. Real API clients plug in here.
#[async_trait]
pub trait HumidityProvider: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    async fn get_humidity(&self, query: &WeatherQuery) -> anyhow::Result<HumidityReading>;
}

/// The closed set of built-in strategies.
#[derive(Debug, Clone)]
pub enum Provider {
    OpenWeather(OpenWeatherProvider),
    WeatherApi(WeatherApiProvider),
    MockData(MockDataProvider),
}

impl Provider {
    pub fn id(&self) -> ProviderId {
        match self {
            Provider::OpenWeather(_) => ProviderId::OpenWeather,
            Provider::WeatherApi(_) => ProviderId::WeatherApi,
            Provider::MockData(_) => ProviderId::MockData,
        }
    }
}

#[async_trait]
impl HumidityProvider for Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::OpenWeather(p) => p.name(),
            Provider::WeatherApi(p) => p.name(),
            Provider::MockData(p) => p.name(),
        }
    }

    async fn get_humidity(&self, query: &WeatherQuery) -> anyhow::Result<HumidityReading> {
        match self {
            Provider::OpenWeather(p) => p.get_humidity(query).await,
            Provider::WeatherApi(p) => p.get_humidity(query).await,
            Provider::MockData(p) => p.get_humidity(query).await,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderOption {
    pub id: ProviderId,
    pub label: &'static str,
}

const AVAILABLE_PROVIDERS: [ProviderOption; 3] = [
    ProviderOption {
        id: ProviderId::OpenWeather,
        label: ProviderId::OpenWeather.label(),
    },
    ProviderOption {
        id: ProviderId::WeatherApi,
        label: ProviderId::WeatherApi.label(),
    },
    ProviderOption {
        id: ProviderId::MockData,
        label: ProviderId::MockData.label(),
    },
];

/// Credentials and endpoint overrides for the API-backed strategies.
#[derive(Debug, Clone, Default)]
struct ApiSettings {
    api_key: Option<String>,
    base_url: Option<String>,
}

/// Builds a fresh strategy per request from a provider id.
#[derive(Debug, Clone, Default)]
pub struct ProviderFactory {
    http: Client,
    openweather: ApiSettings,
    weatherapi: ApiSettings,
}

impl ProviderFactory {
    pub fn from_config(config: &Config) -> Self {
        let settings = |id: ProviderId| {
            let cfg = config.provider_config(id);
            ApiSettings {
                api_key: cfg.map(|c| c.api_key.clone()).filter(|k| !k.is_empty()),
                base_url: cfg.and_then(|c| c.base_url.clone()),
            }
        };

        Self {
            http: Client::new(),
            openweather: settings(ProviderId::OpenWeather),
            weatherapi: settings(ProviderId::WeatherApi),
        }
    }

    pub fn create(&self, provider_id: &str) -> Result<Provider, HumidityError> {
        let id = ProviderId::try_from(provider_id)?;
        Ok(self.create_for(id))
    }

    pub fn create_for(&self, id: ProviderId) -> Provider {
        match id {
            ProviderId::OpenWeather => {
                let key = self.openweather.api_key.clone();
                let mut p = OpenWeatherProvider::new(self.http.clone(), key);
                if let Some(url) = &self.openweather.base_url {
                    p = p.with_base_url(url.clone());
                }
                Provider::OpenWeather(p)
            }
            ProviderId::WeatherApi => {
                let key = self.weatherapi.api_key.clone();
                let mut p = WeatherApiProvider::new(self.http.clone(), key);
                if let Some(url) = &self.weatherapi.base_url {
                    p = p.with_base_url(url.clone());
                }
                Provider::WeatherApi(p)
            }
            ProviderId::MockData => Provider::MockData(MockDataProvider::new()),
        }
    }

    pub fn available_providers() -> &'static [ProviderOption] {
        &AVAILABLE_PROVIDERS
    }
}

/// Shared response construction: rounds the measurements and attaches the
/// classification derived from the rounded humidity.
///
/// The reading's `date` and the date quoted in its message are the query's
/// calendar date as `YYYY-MM-DD`. A request that sent an RFC 3339 timestamp
/// gets that normalized form back, not its original string.
pub fn build_reading(
    humidity: f64,
    query: &WeatherQuery,
    conditions: Conditions,
) -> HumidityReading {
    let humidity = round_hundredths(humidity);
    let date = query.date_string();
    let level = SeverityTier::classify(humidity);

    HumidityReading {
        message: survival_message(humidity, &date),
        date,
        humidity,
        level,
        color: level.color().to_string(),
        location: query.location,
        provider: query.provider,
        temperature: conditions.temperature.map(round_hundredths),
        pressure: conditions.pressure.map(round_hundredths),
        wind_speed: conditions.wind_speed.map(round_hundredths),
    }
}

/// 1-based ordinal day within the year.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
