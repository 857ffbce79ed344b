//! Environmental data ports: weather, air quality and geocoding.

use crate::domain::{AirQualityReading, Location, WeatherReading};

use super::ProviderError;

/// Current weather and UV for a coordinate.
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions.
    ///
    /// # Errors
    /// Returns error if the provider is unreachable or returns unusable data.
    fn current_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherReading, ProviderError>;
}

/// Current air quality for a coordinate.
pub trait AirQualityProvider: Send + Sync {
    /// Fetch current air quality.
    ///
    /// # Errors
    /// Returns error if the provider is unreachable or returns unusable data.
    fn current_air_quality(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<AirQualityReading, ProviderError>;
}

/// Place-name resolution.
pub trait Geocoder: Send + Sync {
    /// Resolve a place name to its best match.
    ///
    /// # Errors
    /// Returns `ProviderError::NoResults` when nothing matches.
    fn geocode(&self, name: &str) -> Result<Location, ProviderError>;
}
