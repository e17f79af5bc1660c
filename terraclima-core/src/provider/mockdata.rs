//! Post-collapse simulation: a dry world with a few surviving oases around
//! the ruins of old coastal cities.

use std::{f64::consts::PI, ops::Range, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use crate::{
    model::{Conditions, Coordinate, HumidityReading, WeatherQuery},
    provider::{build_reading, day_of_year},
};

use super::{HumidityProvider, ProviderId};

/// Former bodies of water that still raise local humidity.
pub const WATER_SOURCES: [Coordinate; 5] = [
    // New York
    Coordinate {
        latitude: 40.7128,
        longitude: -74.0060,
    },
    // Los Angeles
    Coordinate {
        latitude: 34.0522,
        longitude: -118.2437,
    },
    // London
    Coordinate {
        latitude: 51.5074,
        longitude: -0.1278,
    },
    // Tokyo
    Coordinate {
        latitude: 35.6762,
        longitude: 139.6503,
    },
    // Sydney
    Coordinate {
        latitude: -33.8688,
        longitude: 151.2093,
    },
];

/// Distance in degrees under which a point counts as an oasis.
const OASIS_RADIUS_DEG: f64 = 5.0;

const DEFAULT_DELAY_MS: Range<u64> = 500..1500;

#[derive(Debug, Clone)]
pub struct MockDataProvider {
    delay_ms: Range<u64>,
}

impl Default for MockDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDataProvider {
    pub fn new() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
        }
    }

    /// Overrides the simulated network latency. An empty range disables it.
    pub fn with_delay(mut self, delay_ms: Range<u64>) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    fn pick_delay(&self) -> Duration {
        if self.delay_ms.is_empty() {
            return Duration::ZERO;
        }
        let millis = rand::thread_rng().gen_range(self.delay_ms.clone());
        Duration::from_millis(millis)
    }
}

pub fn is_near_water_source(at: Coordinate) -> bool {
    WATER_SOURCES.iter().any(|source| {
        let distance =
            (at.latitude - source.latitude).hypot(at.longitude - source.longitude);
        distance < OASIS_RADIUS_DEG
    })
}

pub(crate) fn synthetic_conditions<R: Rng + ?Sized>(
    rng: &mut R,
    query: &WeatherQuery,
) -> (f64, Conditions) {
    let at = query.location;

    let mut humidity = 20.0;
    if is_near_water_source(at) {
        humidity += 40.0;
    }

    let seasonal = (f64::from(day_of_year(query.date)) / 365.0 * 2.0 * PI).sin() * 15.0;
    let latitude_effect = (at.latitude * PI / 180.0).cos() * 10.0;
    let radiation = rng.gen_range(-10.0..10.0);

    let humidity = (humidity + seasonal + latitude_effect + radiation).clamp(5.0, 85.0);

    let conditions = Conditions {
        temperature: Some(35.0 + rng.gen_range(0.0..20.0) + at.latitude.abs() * 0.2),
        pressure: Some(950.0 + rng.gen_range(0.0..100.0)),
        wind_speed: Some(rng.gen_range(0.0..25.0)),
    };

    (humidity, conditions)
}

#[async_trait]
impl HumidityProvider for MockDataProvider {
    fn name(&self) -> &'static str {
        ProviderId::MockData.label()
    }

    async fn get_humidity(&self, query: &WeatherQuery) -> Result<HumidityReading> {
        let delay = self.pick_delay();
        debug!(delay_ms = delay.as_millis() as u64, "simulating network latency");
        tokio::time::sleep(delay).await;

        let (humidity, conditions) = synthetic_conditions(&mut rand::thread_rng(), query);
        Ok(build_reading(humidity, query, conditions))
    }
}
