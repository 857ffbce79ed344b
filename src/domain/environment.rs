//! Environmental readings and the per-request snapshot built from them.

use serde::{Deserialize, Serialize};

/// Scale an AQI value was reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AqiScale {
    Us,
    European,
}

/// Pollutant concentrations (µg/m³ unless noted). All optional because
/// providers omit components they do not model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantComponents {
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub o3: Option<f64>,
    pub dust: Option<f64>,
    /// Dimensionless
    pub aerosol_optical_depth: Option<f64>,
}

/// Current weather as reported by a weather provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    /// Celsius
    pub temperature: f64,
    /// Celsius
    pub feels_like: f64,
    /// Relative humidity, percent
    pub humidity: f64,
    /// km/h
    pub wind_speed: f64,
    /// Degrees
    pub wind_direction: f64,
    /// WMO weather code
    pub weather_code: u16,
    pub uv_index: f64,
    pub is_day: bool,
}

/// Current air quality as reported by an air-quality provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub aqi: f64,
    pub scale: AqiScale,
    pub components: PollutantComponents,
}

/// Canonical environmental inputs for one request. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalSnapshot {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub weather_code: u16,
    /// Short condition text ("Clear", "Rain", ...)
    pub condition: String,
    /// Longer condition text ("Slight rain", ...)
    pub description: String,
    pub uv_index: f64,
    pub aqi: f64,
    pub aqi_scale: AqiScale,
    pub components: PollutantComponents,
    /// `true` only when both weather and air quality came from live providers.
    pub fetched: bool,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}

impl EnvironmentalSnapshot {
    /// Normalize provider readings into a snapshot.
    #[must_use]
    pub fn from_readings(weather: WeatherReading, air: AirQualityReading, fetched: bool) -> Self {
        let (condition, description) = weather_description(weather.weather_code);
        Self {
            temperature: weather.temperature,
            feels_like: weather.feels_like,
            humidity: weather.humidity,
            wind_speed: weather.wind_speed,
            wind_direction: weather.wind_direction,
            weather_code: weather.weather_code,
            condition: condition.to_string(),
            description: description.to_string(),
            uv_index: weather.uv_index,
            aqi: air.aqi,
            aqi_scale: air.scale,
            components: air.components,
            fetched,
            fetched_at: chrono::Utc::now(),
        }
    }

    /// Compass point for the wind direction.
    #[must_use]
    pub fn wind_compass(&self) -> &'static str {
        wind_compass(self.wind_direction)
    }
}

/// WMO weather interpretation codes: (code, condition, description).
const WEATHER_CODES: &[(u16, &str, &str)] = &[
    (0, "Clear", "Clear sky"),
    (1, "Mainly Clear", "Mainly clear"),
    (2, "Partly Cloudy", "Partly cloudy"),
    (3, "Overcast", "Overcast"),
    (45, "Fog", "Fog"),
    (48, "Depositing Rime Fog", "Depositing rime fog"),
    (51, "Drizzle", "Light drizzle"),
    (53, "Drizzle", "Moderate drizzle"),
    (55, "Drizzle", "Dense drizzle"),
    (56, "Freezing Drizzle", "Light freezing drizzle"),
    (57, "Freezing Drizzle", "Dense freezing drizzle"),
    (61, "Rain", "Slight rain"),
    (63, "Rain", "Moderate rain"),
    (65, "Rain", "Heavy rain"),
    (66, "Freezing Rain", "Light freezing rain"),
    (67, "Freezing Rain", "Heavy freezing rain"),
    (71, "Snow", "Slight snowfall"),
    (73, "Snow", "Moderate snowfall"),
    (75, "Snow", "Heavy snowfall"),
    (77, "Snow Grains", "Snow grains"),
    (80, "Rain Showers", "Slight rain showers"),
    (81, "Rain Showers", "Moderate rain showers"),
    (82, "Rain Showers", "Violent rain showers"),
    (85, "Snow Showers", "Slight snow showers"),
    (86, "Snow Showers", "Heavy snow showers"),
    (95, "Thunderstorm", "Thunderstorm"),
    (96, "Thunderstorm", "Thunderstorm with slight hail"),
    (99, "Thunderstorm", "Thunderstorm with heavy hail"),
];

/// Map a WMO weather code to (condition, description).
#[must_use]
pub fn weather_description(code: u16) -> (&'static str, &'static str) {
    WEATHER_CODES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, main, desc)| (*main, *desc))
        .unwrap_or(("Unknown", "Unknown weather"))
}

/// Eight-point compass direction for a bearing in degrees.
#[must_use]
pub fn wind_compass(degrees: f64) -> &'static str {
    const DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    if !degrees.is_finite() {
        return "N";
    }
    let normalized = degrees.rem_euclid(360.0);
    let index = (normalized / 45.0).round() as usize % 8;
    DIRECTIONS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_description_lookup() {
        assert_eq!(weather_description(0), ("Clear", "Clear sky"));
        assert_eq!(weather_description(63), ("Rain", "Moderate rain"));
        assert_eq!(weather_description(42), ("Unknown", "Unknown weather"));
    }

    #[test]
    fn test_wind_compass() {
        assert_eq!(wind_compass(0.0), "N");
        assert_eq!(wind_compass(44.0), "NE");
        assert_eq!(wind_compass(180.0), "S");
        assert_eq!(wind_compass(350.0), "N");
        assert_eq!(wind_compass(-90.0), "W");
    }

    #[test]
    fn test_snapshot_from_readings() {
        let weather = WeatherReading {
            temperature: 24.0,
            feels_like: 25.0,
            humidity: 55.0,
            wind_speed: 12.0,
            wind_direction: 90.0,
            weather_code: 2,
            uv_index: 6.3,
            is_day: true,
        };
        let air = AirQualityReading {
            aqi: 42.0,
            scale: AqiScale::Us,
            components: PollutantComponents::default(),
        };

        let snapshot = EnvironmentalSnapshot::from_readings(weather, air, true);
        assert_eq!(snapshot.condition, "Partly Cloudy");
        assert_eq!(snapshot.wind_compass(), "E");
        assert!((snapshot.uv_index - 6.3).abs() < f64::EPSILON);
        assert!(snapshot.fetched);
    }
}
