//! Open-Meteo adapter: weather + UV, air quality and geocoding.
//!
//! Responses are decoded into typed structs and normalized by pure functions
//! so normalization can be tested without network access.

use serde::Deserialize;

use crate::adapters::http::HttpClient;
use crate::domain::{AirQualityReading, AqiScale, Location, PollutantComponents, WeatherReading};
use crate::ports::{AirQualityProvider, Geocoder, ProviderError, WeatherProvider};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";
pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

const WEATHER_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,is_day,\
     weather_code,wind_speed_10m,wind_direction_10m,uv_index";
const AIR_QUALITY_FIELDS: &str = "us_aqi,european_aqi,pm2_5,pm10,carbon_monoxide,nitrogen_dioxide,\
     sulphur_dioxide,ozone,dust,aerosol_optical_depth";

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub current: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentWeather {
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub is_day: Option<u8>,
    pub weather_code: Option<u16>,
    pub wind_speed_10m: Option<f64>,
    pub wind_direction_10m: Option<f64>,
    pub uv_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AirQualityResponse {
    pub current: Option<CurrentAirQuality>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentAirQuality {
    pub us_aqi: Option<f64>,
    pub european_aqi: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub carbon_monoxide: Option<f64>,
    pub nitrogen_dioxide: Option<f64>,
    pub sulphur_dioxide: Option<f64>,
    pub ozone: Option<f64>,
    pub dust: Option<f64>,
    pub aerosol_optical_depth: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub admin1: Option<String>,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Normalize a forecast response.
///
/// Temperature and weather code are required; other fields default to zero.
/// A missing UV index reads as 0.
///
/// # Errors
/// Returns `ProviderError::Malformed` when required fields are absent.
pub fn parse_weather(response: ForecastResponse) -> Result<WeatherReading, ProviderError> {
    let current = response
        .current
        .ok_or_else(|| ProviderError::Malformed("missing 'current' block".to_string()))?;
    let temperature = finite(current.temperature_2m)
        .ok_or_else(|| ProviderError::Malformed("missing temperature_2m".to_string()))?;
    let weather_code = current
        .weather_code
        .ok_or_else(|| ProviderError::Malformed("missing weather_code".to_string()))?;

    Ok(WeatherReading {
        temperature,
        feels_like: finite(current.apparent_temperature).unwrap_or(temperature),
        humidity: finite(current.relative_humidity_2m).unwrap_or(0.0),
        wind_speed: finite(current.wind_speed_10m).unwrap_or(0.0),
        wind_direction: finite(current.wind_direction_10m).unwrap_or(0.0),
        weather_code,
        uv_index: finite(current.uv_index).unwrap_or(0.0).max(0.0),
        is_day: current.is_day.unwrap_or(1) == 1,
    })
}

/// Normalize an air-quality response. US AQI is preferred; the European
/// index is used when the US value is absent.
///
/// # Errors
/// Returns `ProviderError::Malformed` when neither index is present.
pub fn parse_air_quality(response: AirQualityResponse) -> Result<AirQualityReading, ProviderError> {
    let current = response
        .current
        .ok_or_else(|| ProviderError::Malformed("missing 'current' block".to_string()))?;
    let (aqi, scale) = match (finite(current.us_aqi), finite(current.european_aqi)) {
        (Some(us), _) => (us, AqiScale::Us),
        (None, Some(eu)) => (eu, AqiScale::European),
        (None, None) => {
            return Err(ProviderError::Malformed("no AQI value in response".to_string()));
        }
    };

    Ok(AirQualityReading {
        aqi,
        scale,
        components: PollutantComponents {
            pm2_5: finite(current.pm2_5),
            pm10: finite(current.pm10),
            co: finite(current.carbon_monoxide),
            no2: finite(current.nitrogen_dioxide),
            so2: finite(current.sulphur_dioxide),
            o3: finite(current.ozone),
            dust: finite(current.dust),
            aerosol_optical_depth: finite(current.aerosol_optical_depth),
        },
    })
}

/// Pick the first geocoding match.
///
/// # Errors
/// Returns `ProviderError::NoResults` when the result list is empty.
pub fn parse_geocoding(query: &str, response: GeocodingResponse) -> Result<Location, ProviderError> {
    let best = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::NoResults(query.to_string()))?;

    let name = match (best.admin1, best.country) {
        (Some(region), Some(country)) if region != best.name => {
            format!("{}, {}, {}", best.name, region, country)
        }
        (_, Some(country)) => format!("{}, {}", best.name, country),
        _ => best.name,
    };
    Ok(Location::new(name, best.latitude, best.longitude))
}

/// Open-Meteo client implementing the environmental ports.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: HttpClient,
    forecast_url: String,
    air_quality_url: String,
    geocoding_url: String,
}

impl OpenMeteoClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            forecast_url: FORECAST_URL.to_string(),
            air_quality_url: AIR_QUALITY_URL.to_string(),
            geocoding_url: GEOCODING_URL.to_string(),
        }
    }

    fn coordinate_query(latitude: f64, longitude: f64, current: &str) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", format!("{latitude:.4}")),
            ("longitude", format!("{longitude:.4}")),
            ("current", current.to_string()),
            ("timezone", "auto".to_string()),
        ]
    }
}

impl WeatherProvider for OpenMeteoClient {
    fn current_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherReading, ProviderError> {
        tracing::debug!("Fetching Open-Meteo weather");
        let query = Self::coordinate_query(latitude, longitude, WEATHER_FIELDS);
        let response: ForecastResponse = self.http.get_json(&self.forecast_url, &query, &[])?;
        parse_weather(response)
    }
}

impl AirQualityProvider for OpenMeteoClient {
    fn current_air_quality(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<AirQualityReading, ProviderError> {
        tracing::debug!("Fetching Open-Meteo air quality");
        let query = Self::coordinate_query(latitude, longitude, AIR_QUALITY_FIELDS);
        let response: AirQualityResponse = self.http.get_json(&self.air_quality_url, &query, &[])?;
        parse_air_quality(response)
    }
}

impl Geocoder for OpenMeteoClient {
    fn geocode(&self, name: &str) -> Result<Location, ProviderError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProviderError::NoResults(String::new()));
        }
        let query = [
            ("name", name.to_string()),
            ("count", "1".to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];
        let response: GeocodingResponse = self.http.get_json(&self.geocoding_url, &query, &[])?;
        parse_geocoding(name, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_weather() {
        let response: ForecastResponse = serde_json::from_value(json!({
            "latitude": 38.7,
            "longitude": -9.1,
            "current": {
                "time": "2024-07-01T13:00",
                "temperature_2m": 31.2,
                "relative_humidity_2m": 40,
                "apparent_temperature": 32.8,
                "is_day": 1,
                "weather_code": 1,
                "wind_speed_10m": 12.5,
                "wind_direction_10m": 300,
                "uv_index": 8.65
            }
        }))
        .expect("Should decode");

        let reading = parse_weather(response).expect("Should parse");
        assert!((reading.temperature - 31.2).abs() < f64::EPSILON);
        assert!((reading.uv_index - 8.65).abs() < f64::EPSILON);
        assert_eq!(reading.weather_code, 1);
        assert!(reading.is_day);
    }

    #[test]
    fn test_parse_weather_missing_uv_reads_zero() {
        let response: ForecastResponse = serde_json::from_value(json!({
            "current": { "temperature_2m": 12.0, "weather_code": 61 }
        }))
        .expect("Should decode");
        let reading = parse_weather(response).expect("Should parse");
        assert_eq!(reading.uv_index, 0.0);
        assert!((reading.feels_like - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_weather_rejects_empty() {
        let response: ForecastResponse =
            serde_json::from_value(json!({ "error": true })).expect("Should decode");
        assert!(matches!(parse_weather(response), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_parse_air_quality_prefers_us() {
        let response: AirQualityResponse = serde_json::from_value(json!({
            "current": {
                "us_aqi": 72,
                "european_aqi": 35,
                "pm2_5": 18.3,
                "ozone": 88.0
            }
        }))
        .expect("Should decode");
        let reading = parse_air_quality(response).expect("Should parse");
        assert_eq!(reading.scale, AqiScale::Us);
        assert!((reading.aqi - 72.0).abs() < f64::EPSILON);
        assert_eq!(reading.components.pm2_5, Some(18.3));
        assert_eq!(reading.components.co, None);
    }

    #[test]
    fn test_parse_air_quality_european_fallback() {
        let response: AirQualityResponse = serde_json::from_value(json!({
            "current": { "us_aqi": null, "european_aqi": 48 }
        }))
        .expect("Should decode");
        let reading = parse_air_quality(response).expect("Should parse");
        assert_eq!(reading.scale, AqiScale::European);

        let empty: AirQualityResponse =
            serde_json::from_value(json!({ "current": {} })).expect("Should decode");
        assert!(parse_air_quality(empty).is_err());
    }

    #[test]
    fn test_parse_geocoding() {
        let response: GeocodingResponse = serde_json::from_value(json!({
            "results": [
                { "name": "Porto", "latitude": 41.15, "longitude": -8.61,
                  "country": "Portugal", "admin1": "Porto" }
            ]
        }))
        .expect("Should decode");
        let location = parse_geocoding("porto", response).expect("Should parse");
        assert_eq!(location.name, "Porto, Portugal");

        let none: GeocodingResponse =
            serde_json::from_value(json!({ "generationtime_ms": 0.5 })).expect("Should decode");
        assert!(matches!(
            parse_geocoding("atlantis", none),
            Err(ProviderError::NoResults(_))
        ));
    }
}
