//! Aggregation gateway: builds the environmental snapshot for a location.
//!
//! The weather and air-quality calls are issued concurrently. Each one
//! degrades independently to bounded synthetic values; there are no retries.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::domain::{
    AirQualityReading, AqiScale, Conditions, EnvironmentalSnapshot, PollutantComponents,
    WeatherReading,
};
use crate::ports::{AirQualityProvider, ProviderError, WeatherProvider};

/// UV index used whenever weather data is synthetic (top of the Moderate band).
pub const FALLBACK_UV_INDEX: f64 = 5.0;

/// Synthetic weather within plausible daytime ranges.
pub fn synthetic_weather<R: Rng>(rng: &mut R) -> WeatherReading {
    WeatherReading {
        temperature: f64::from(rng.gen_range(20_u8..35)),
        feels_like: f64::from(rng.gen_range(18_u8..33)),
        humidity: f64::from(rng.gen_range(40_u8..80)),
        wind_speed: f64::from(rng.gen_range(5_u8..25)),
        wind_direction: 180.0,
        weather_code: 1,
        uv_index: FALLBACK_UV_INDEX,
        is_day: true,
    }
}

/// Synthetic US-scale air quality between Good and Unhealthy for Sensitive
/// Groups.
pub fn synthetic_air_quality<R: Rng>(rng: &mut R) -> AirQualityReading {
    let mut sample = |low: f64, span: f64, decimals: i32| {
        let factor = 10f64.powi(decimals);
        ((low + rng.gen::<f64>() * span) * factor).round() / factor
    };
    let components = PollutantComponents {
        pm2_5: Some(sample(5.0, 30.0, 1)),
        pm10: Some(sample(10.0, 50.0, 1)),
        co: Some(sample(100.0, 1000.0, 1)),
        no2: Some(sample(10.0, 50.0, 1)),
        so2: Some(sample(0.0, 20.0, 1)),
        o3: Some(sample(30.0, 60.0, 1)),
        dust: Some(sample(0.0, 20.0, 1)),
        aerosol_optical_depth: Some(sample(0.0, 2.0, 2)),
    };
    AirQualityReading {
        aqi: f64::from(rng.gen_range(1_u8..=150)),
        scale: AqiScale::Us,
        components,
    }
}

/// Gateway over the weather and air-quality providers.
pub struct AggregationGateway<W, A>
where
    W: WeatherProvider,
    A: AirQualityProvider,
{
    weather: Arc<W>,
    air_quality: Arc<A>,
}

impl<W, A> AggregationGateway<W, A>
where
    W: WeatherProvider,
    A: AirQualityProvider,
{
    /// Create a new gateway.
    pub fn new(weather: Arc<W>, air_quality: Arc<A>) -> Self {
        Self {
            weather,
            air_quality,
        }
    }

    /// Fetch a snapshot for a coordinate.
    ///
    /// Never fails. `fetched` is `true` only if both providers answered.
    pub fn fetch_snapshot(&self, latitude: f64, longitude: f64) -> EnvironmentalSnapshot {
        tracing::debug!("Fetching environmental data");

        let (weather, air) = std::thread::scope(|scope| {
            let weather = scope.spawn(|| self.weather.current_weather(latitude, longitude));
            let air = scope.spawn(|| self.air_quality.current_air_quality(latitude, longitude));
            (join(weather), join(air))
        });

        let mut rng = ChaCha20Rng::from_entropy();
        let mut fetched = true;

        let weather = weather.unwrap_or_else(|e| {
            tracing::warn!("Weather provider failed, using synthetic data: {}", e);
            fetched = false;
            synthetic_weather(&mut rng)
        });
        let air = air.unwrap_or_else(|e| {
            tracing::warn!("Air-quality provider failed, using synthetic data: {}", e);
            fetched = false;
            synthetic_air_quality(&mut rng)
        });

        EnvironmentalSnapshot::from_readings(weather, air, fetched)
    }

    /// Fetch and classify.
    pub fn fetch_conditions(&self, latitude: f64, longitude: f64) -> Conditions {
        Conditions::assess(self.fetch_snapshot(latitude, longitude))
    }
}

/// Fully synthetic snapshot, used when no location is known.
#[must_use]
pub fn synthetic_snapshot() -> EnvironmentalSnapshot {
    let mut rng = ChaCha20Rng::from_entropy();
    let weather = synthetic_weather(&mut rng);
    let air = synthetic_air_quality(&mut rng);
    EnvironmentalSnapshot::from_readings(weather, air, false)
}

fn join<T>(
    handle: std::thread::ScopedJoinHandle<'_, Result<T, ProviderError>>,
) -> Result<T, ProviderError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(ProviderError::Request("provider call panicked".to_string())))
}
