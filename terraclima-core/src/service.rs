use chrono::NaiveDate;
use tracing::{error, info};

use crate::{
    Config, HumidityError,
    model::{Coordinate, HumidityReading, ResultEnvelope, WeatherQuery},
    provider::{HumidityProvider, ProviderFactory},
};

/// Resolves a strategy and folds every outcome into a [`ResultEnvelope`].
/// Inputs are expected to be validated already.
#[derive(Debug, Clone, Default)]
pub struct WeatherService {
    factory: ProviderFactory,
}

impl WeatherService {
    pub fn new(factory: ProviderFactory) -> Self {
        Self { factory }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ProviderFactory::from_config(config))
    }

    pub async fn get_reading(
        &self,
        location: Coordinate,
        date: NaiveDate,
        provider: &str,
    ) -> ResultEnvelope {
        self.try_reading(location, date, provider).await.into()
    }

    /// Same as [`Self::get_reading`], keeping the error kind so callers can
    /// tell an unknown provider id from a failing strategy.
    pub async fn try_reading(
        &self,
        location: Coordinate,
        date: NaiveDate,
        provider: &str,
    ) -> Result<HumidityReading, HumidityError> {
        let strategy = self.factory.create(provider).inspect_err(|err| {
            error!(provider, error = %err, "could not resolve provider");
        })?;

        let query = WeatherQuery {
            location,
            date,
            provider: strategy.id(),
        };
        self.try_run(&strategy, &query).await
    }

    /// Runs any strategy, built-in or injected, under the envelope contract.
    pub async fn run<P>(&self, strategy: &P, query: &WeatherQuery) -> ResultEnvelope
    where
        P: HumidityProvider + ?Sized,
    {
        self.try_run(strategy, query).await.into()
    }

    async fn try_run<P>(
        &self,
        strategy: &P,
        query: &WeatherQuery,
    ) -> Result<HumidityReading, HumidityError>
    where
        P: HumidityProvider + ?Sized,
    {
        match strategy.get_humidity(query).await {
            Ok(reading) => {
                info!(
                    provider = strategy.name(),
                    humidity = reading.humidity,
                    level = %reading.level,
                    "humidity reading produced"
                );
                Ok(reading)
            }
            Err(err) => {
                let detail = format!("{err:#}");
                error!(provider = strategy.name(), error = %detail, "provider failed");
                Err(HumidityError::Service(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HumidityReading, ProviderId};
    use anyhow::anyhow;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct BrokenProvider;

    #[async_trait]
    impl HumidityProvider for BrokenProvider {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn get_humidity(&self, _query: &WeatherQuery) -> anyhow::Result<HumidityReading> {
            Err(anyhow!("sensor array offline"))
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2087, 1, 10).unwrap()
    }

    #[tokio::test]
    async fn unsupported_provider_becomes_failure_envelope() {
        let service = WeatherService::default();
        let envelope = service
            .get_reading(Coordinate::new(0.0, 0.0), date(), "unknown")
            .await;

        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert!(envelope.error.unwrap().contains("unknown"));
    }

    #[tokio::test]
    async fn unsupported_provider_is_a_client_error() {
        let err = WeatherService::default()
            .try_reading(Coordinate::new(0.0, 0.0), date(), "darksky")
            .await
            .unwrap_err();

        assert!(matches!(err, HumidityError::UnsupportedProvider(ref id) if id == "darksky"));
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn external_flavored_providers_always_succeed() {
        let service = WeatherService::default();

        for provider in ["openweather", "weatherapi"] {
            let envelope = service
                .get_reading(Coordinate::new(12.5, 99.1), date(), provider)
                .await;
            assert!(envelope.success, "{provider}");
            let data = envelope.data.unwrap();
            assert_eq!(data.provider.as_str(), provider);
            assert_eq!(data.date, "2087-01-10");
            assert!(envelope.error.is_none());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn mock_provider_through_service() {
        let service = WeatherService::default();
        let envelope = service
            .get_reading(Coordinate::new(35.6762, 139.6503), date(), "mockdata")
            .await;

        let data = envelope.data.expect("success");
        assert_eq!(data.provider, ProviderId::MockData);
        assert!((5.0..=85.0).contains(&data.humidity));
    }

    #[tokio::test]
    async fn strategy_failure_is_caught() {
        let service = WeatherService::default();
        let query = WeatherQuery {
            location: Coordinate::new(1.0, 1.0),
            date: date(),
            provider: ProviderId::MockData,
        };

        let envelope = service.run(&BrokenProvider, &query).await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("sensor array offline"));
    }
}
