//! Unified weather response model
//!
//! Every provider adapter normalizes into these types; they are the only
//! weather shapes that cross the HTTP boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Provenance of a response or of a single daily entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    /// Primary provider (WeatherAPI.com)
    WeatherApi,
    /// Secondary provider (OpenWeatherMap)
    OpenWeatherMap,
    /// Primary days extended with secondary days
    Combined,
    /// Synthetic demo data
    Mock,
}

impl WeatherSource {
    /// Display name used in forecast messages
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::WeatherApi => "WeatherAPI",
            Self::OpenWeatherMap => "OpenWeatherMap",
            Self::Combined => "WeatherAPI + OpenWeatherMap",
            Self::Mock => "Demo data",
        }
    }
}

impl std::fmt::Display for WeatherSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Top-level response returned by the weather endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedWeatherResponse {
    pub source: WeatherSource,
    pub forecast_info: ForecastInfo,
    pub location: LocationInfo,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlySample>,
    pub daily: Vec<DailySummary>,
}

/// Day-coverage bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastInfo {
    pub total_days: usize,
    pub weather_api_days: usize,
    pub open_weather_days: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    pub name: String,
    pub region: String,
    pub country: String,
    /// IANA zone name when known, otherwise a `UTC±HH:MM` offset
    pub timezone: String,
}

/// Weather condition text and icon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub text: String,
    /// Absolute https URL of a high-resolution icon
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    /// Celsius
    pub temperature: f64,
    pub feels_like: f64,
    /// Percent
    pub humidity: u8,
    /// hPa
    pub pressure: f64,
    /// m/s
    pub wind_speed: f64,
    /// 16-point compass direction, e.g. `"WSW"`
    pub wind_direction: String,
    pub wind_degree: u16,
    pub uv_index: Option<f64>,
    /// Kilometers
    pub visibility: f64,
    pub condition: Condition,
    /// Local time, 12-hour format (`"6:42 AM"`)
    pub sunrise: String,
    pub sunset: String,
    pub is_day: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlySample {
    /// Epoch seconds
    pub timestamp: i64,
    pub temperature: f64,
    pub feels_like: Option<f64>,
    pub humidity: u8,
    pub wind_speed: f64,
    /// 0.0 - 1.0
    pub precipitation_probability: f64,
    pub uv_index: Option<f64>,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// Epoch seconds of UTC midnight on `date`
    pub timestamp: i64,
    /// Calendar date in the location's local time
    pub date: NaiveDate,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub precipitation_probability: f64,
    pub uv_index: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub source: WeatherSource,
    pub condition: Condition,
}

/// Upper bound on hourly samples in any response
pub const MAX_HOURLY_SAMPLES: usize = 24;

/// Convert km/h to m/s
#[must_use]
pub fn kph_to_ms(kph: f64) -> f64 {
    kph / 3.6
}

/// Convert meters to kilometers
#[must_use]
pub fn meters_to_km(meters: f64) -> f64 {
    meters / 1000.0
}

/// Convert a percentage (0-100) into a probability (0-1)
#[must_use]
pub fn percent_to_probability(percent: f64) -> f64 {
    (percent / 100.0).clamp(0.0, 1.0)
}

/// Clamp a float humidity reading into a whole percentage
#[must_use]
pub fn humidity_percent(value: f64) -> u8 {
    // Bounded to 0..=100 before the cast.
    value.round().clamp(0.0, 100.0) as u8
}

/// Convert wind direction from degrees to a 16-point compass direction
#[must_use]
pub fn wind_direction_to_cardinal(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let index = (degrees / 22.5).round().rem_euclid(16.0) as usize;
    POINTS[index % 16]
}

/// Format a UTC offset in seconds as `UTC±HH:MM`
#[must_use]
pub fn utc_offset_label(utc_offset: i64) -> String {
    if utc_offset == 0 {
        return "UTC".to_string();
    }
    let sign = if utc_offset < 0 { '-' } else { '+' };
    let minutes = utc_offset.abs() / 60;
    format!("UTC{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "N")]
    #[case(11.0, "N")]
    #[case(12.0, "NNE")]
    #[case(45.0, "NE")]
    #[case(90.0, "E")]
    #[case(180.0, "S")]
    #[case(247.5, "WSW")]
    #[case(270.0, "W")]
    #[case(350.0, "N")]
    #[case(360.0, "N")]
    fn test_wind_direction_to_cardinal(#[case] degrees: f64, #[case] expected: &str) {
        assert_eq!(wind_direction_to_cardinal(degrees), expected);
    }

    #[rstest]
    #[case(0, "UTC")]
    #[case(19_800, "UTC+05:30")]
    #[case(-18_000, "UTC-05:00")]
    #[case(3600, "UTC+01:00")]
    #[case(-34_200, "UTC-09:30")]
    fn test_utc_offset_label(#[case] offset: i64, #[case] expected: &str) {
        assert_eq!(utc_offset_label(offset), expected);
    }

    #[test]
    fn test_unit_conversions() {
        assert!((kph_to_ms(36.0) - 10.0).abs() < 1e-9);
        assert!((kph_to_ms(12.5) - 12.5 / 3.6).abs() < 1e-9);
        assert!((meters_to_km(10_000.0) - 10.0).abs() < 1e-9);
        assert!((percent_to_probability(85.0) - 0.85).abs() < 1e-9);
        assert!((percent_to_probability(140.0) - 1.0).abs() < 1e-9);
        assert_eq!(humidity_percent(74.6), 75);
    }

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&WeatherSource::WeatherApi).unwrap(), "\"weatherapi\"");
        assert_eq!(
            serde_json::to_string(&WeatherSource::OpenWeatherMap).unwrap(),
            "\"openweathermap\""
        );
        assert_eq!(serde_json::to_string(&WeatherSource::Combined).unwrap(), "\"combined\"");
        assert_eq!(serde_json::to_string(&WeatherSource::Mock).unwrap(), "\"mock\"");
    }

    #[test]
    fn test_forecast_info_field_names() {
        let info = ForecastInfo {
            total_days: 5,
            weather_api_days: 3,
            open_weather_days: 2,
            message: "m".to_string(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["totalDays"], 5);
        assert_eq!(json["weatherApiDays"], 3);
        assert_eq!(json["openWeatherDays"], 2);
    }
}
