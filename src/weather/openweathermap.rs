//! OpenWeatherMap adapter (secondary provider)
//!
//! Longer-horizon, lower-fidelity source. Used either to extend the primary
//! forecast with extra days or as the sole source when the primary is
//! unavailable. Its forecast comes in 3-hour steps, which are grouped into
//! local calendar days to build daily summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime};
use tracing::{debug, instrument};

use super::client::UpstreamClient;
use crate::config::ProviderConfig;
use crate::location::LocationQuery;
use crate::models::weather::{
    Condition, CurrentConditions, DailySummary, HourlySample, LocationInfo, humidity_percent,
    meters_to_km, utc_offset_label, wind_direction_to_cardinal,
};
use crate::models::{ProviderResult, WeatherSource};
use crate::{Result, SaviourError};

pub const PROVIDER: &str = "openweathermap";

/// Free-tier forecast horizon
pub const MAX_FORECAST_DAYS: usize = 5;

/// 3-hour samples covering the next 24 hours
const HOURLY_SAMPLES: usize = 8;

/// Reported by the API when visibility is not measured
const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

const SECONDS_PER_DAY: i64 = 86_400;

/// Client for the OpenWeatherMap current-weather and 5-day forecast endpoints
#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    client: UpstreamClient,
    config: ProviderConfig,
}

impl OpenWeatherMapProvider {
    #[must_use]
    pub fn new(client: UpstreamClient, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.key().is_some()
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .key()
            .ok_or_else(|| SaviourError::missing_credentials(PROVIDER))
    }

    fn endpoint_url(&self, endpoint: &str, api_key: &str, location: &str) -> String {
        format!(
            "{}/{}?q={}&appid={}&units=metric",
            self.config.base_url.trim_end_matches('/'),
            endpoint,
            urlencoding::encode(location),
            urlencoding::encode(api_key)
        )
    }

    async fn fetch_current(&self, query: &LocationQuery) -> Result<api::CurrentResponse> {
        let url = self.endpoint_url("weather", self.api_key()?, &query.to_query_string());
        self.client
            .get_json(&url, &query.cache_key("openweathermap:weather"))
            .await
    }

    async fn fetch_forecast(&self, query: &LocationQuery) -> Result<api::ForecastResponse> {
        let url = self.endpoint_url("forecast", self.api_key()?, &query.to_query_string());
        self.client
            .get_json(&url, &query.cache_key("openweathermap:forecast"))
            .await
    }

    /// Fetch current conditions and forecast as a standalone result.
    #[instrument(skip(self), fields(location = %query.to_query_string()))]
    pub async fn fetch(&self, query: &LocationQuery) -> Result<ProviderResult> {
        let current = self.fetch_current(query).await?;
        let forecast = self.fetch_forecast(query).await?;

        let result = normalize(current, forecast, query)?;
        debug!(
            "OpenWeatherMap returned {} days, {} hourly samples",
            result.daily.len(),
            result.hourly.len()
        );
        Ok(result)
    }

    /// Fetch only the forecast, summarized per local calendar day.
    #[instrument(skip(self), fields(location = %query.to_query_string()))]
    pub async fn fetch_daily(&self, query: &LocationQuery) -> Result<Vec<DailySummary>> {
        let forecast = self.fetch_forecast(query).await?;
        Ok(bucket_by_day(&forecast.list, forecast.city.timezone))
    }
}

/// Absolute URL of the 2x icon for an OpenWeatherMap icon code
#[must_use]
pub fn icon_url(code: &str) -> String {
    format!("https://openweathermap.org/img/wn/{code}@2x.png")
}

/// Format epoch seconds as a 12-hour local clock time, e.g. `"6:42 AM"`
#[must_use]
pub fn local_clock(epoch: i64, utc_offset: i64) -> String {
    DateTime::from_timestamp(epoch + utc_offset, 0)
        .map(|dt| dt.format("%-I:%M %p").to_string())
        .unwrap_or_default()
}

fn local_date(epoch: i64, utc_offset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(epoch + utc_offset, 0).map(|dt| dt.date_naive())
}

fn local_hour(epoch: i64, utc_offset: i64) -> i64 {
    (epoch + utc_offset).rem_euclid(SECONDS_PER_DAY) / 3600
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn condition(weather: &[api::Weather]) -> Condition {
    weather.first().map_or_else(
        || Condition {
            text: "Unknown".to_string(),
            icon: icon_url("01d"),
        },
        |w| Condition {
            text: capitalize(&w.description),
            icon: icon_url(&w.icon),
        },
    )
}

/// Group 3-hour samples by local calendar date and summarize each day.
///
/// Returns at most [`MAX_FORECAST_DAYS`] chronological summaries.
#[must_use]
pub fn bucket_by_day(list: &[api::ForecastEntry], utc_offset: i64) -> Vec<DailySummary> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&api::ForecastEntry>> = BTreeMap::new();
    for entry in list {
        if let Some(date) = local_date(entry.dt, utc_offset) {
            buckets.entry(date).or_default().push(entry);
        }
    }

    buckets
        .into_iter()
        .filter_map(|(date, entries)| summarize_day(date, &entries, utc_offset))
        .take(MAX_FORECAST_DAYS)
        .collect()
}

fn summarize_day(
    date: NaiveDate,
    entries: &[&api::ForecastEntry],
    utc_offset: i64,
) -> Option<DailySummary> {
    let representative = entries
        .iter()
        .min_by_key(|e| (local_hour(e.dt, utc_offset) - 12).abs())?;

    let count = entries.len() as f64;
    let min_temperature = entries
        .iter()
        .map(|e| e.main.temp_min)
        .fold(f64::INFINITY, f64::min);
    let max_temperature = entries
        .iter()
        .map(|e| e.main.temp_max)
        .fold(f64::NEG_INFINITY, f64::max);
    let humidity = entries.iter().map(|e| e.main.humidity).sum::<f64>() / count;
    let wind_speed = entries.iter().map(|e| e.wind.speed).sum::<f64>() / count;
    let precipitation_probability = entries.iter().map(|e| e.pop).fold(0.0, f64::max);

    Some(DailySummary {
        timestamp: date.and_time(NaiveTime::MIN).and_utc().timestamp(),
        date,
        min_temperature,
        max_temperature,
        humidity: humidity_percent(humidity),
        wind_speed,
        precipitation_probability,
        uv_index: None,
        sunrise: None,
        sunset: None,
        source: WeatherSource::OpenWeatherMap,
        condition: condition(&representative.weather),
    })
}

/// Convert OpenWeatherMap current + forecast responses into a provider result.
///
/// A forecast that yields no daily summaries is rejected as a parse error.
pub fn normalize(
    current: api::CurrentResponse,
    forecast: api::ForecastResponse,
    query: &LocationQuery,
) -> Result<ProviderResult> {
    let daily = bucket_by_day(&forecast.list, forecast.city.timezone);
    if daily.is_empty() {
        return Err(SaviourError::parse("OpenWeatherMap forecast has no entries"));
    }

    let offset = current.timezone;
    let is_day = current.dt >= current.sys.sunrise && current.dt < current.sys.sunset;

    let conditions = CurrentConditions {
        temperature: current.main.temp,
        feels_like: current.main.feels_like,
        humidity: humidity_percent(current.main.humidity),
        pressure: current.main.pressure,
        wind_speed: current.wind.speed,
        wind_direction: wind_direction_to_cardinal(current.wind.deg).to_string(),
        wind_degree: current.wind.deg.round().rem_euclid(360.0) as u16,
        // Not exposed by the free tier.
        uv_index: None,
        visibility: meters_to_km(current.visibility.unwrap_or(DEFAULT_VISIBILITY_M)),
        condition: condition(&current.weather),
        sunrise: local_clock(current.sys.sunrise, offset),
        sunset: local_clock(current.sys.sunset, offset),
        is_day,
    };

    let hourly = forecast
        .list
        .iter()
        .take(HOURLY_SAMPLES)
        .map(|entry| HourlySample {
            timestamp: entry.dt,
            temperature: entry.main.temp,
            feels_like: Some(entry.main.feels_like),
            humidity: humidity_percent(entry.main.humidity),
            wind_speed: entry.wind.speed,
            precipitation_probability: entry.pop.clamp(0.0, 1.0),
            uv_index: None,
            condition: condition(&entry.weather),
        })
        .collect();

    let country = current
        .sys
        .country
        .filter(|c| !c.is_empty())
        .or_else(|| query.country().map(str::to_string))
        .unwrap_or_default();

    Ok(ProviderResult {
        source: WeatherSource::OpenWeatherMap,
        location: LocationInfo {
            name: current.name,
            region: query.state().unwrap_or_default().to_string(),
            country,
            timezone: utc_offset_label(offset),
        },
        current: conditions,
        hourly,
        daily,
    })
}

/// OpenWeatherMap `/weather` and `/forecast` response structures
pub mod api {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Weather {
        pub description: String,
        pub icon: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Wind {
        pub speed: f64,
        #[serde(default)]
        pub deg: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentMain {
        pub temp: f64,
        pub feels_like: f64,
        pub pressure: f64,
        pub humidity: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Sys {
        #[serde(default)]
        pub country: Option<String>,
        pub sunrise: i64,
        pub sunset: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        #[serde(default)]
        pub weather: Vec<Weather>,
        pub main: CurrentMain,
        #[serde(default)]
        pub visibility: Option<f64>,
        pub wind: Wind,
        pub sys: Sys,
        /// Shift in seconds from UTC
        pub timezone: i64,
        pub name: String,
        pub dt: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastMain {
        pub temp: f64,
        pub feels_like: f64,
        pub temp_min: f64,
        pub temp_max: f64,
        pub humidity: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastEntry {
        pub dt: i64,
        pub main: ForecastMain,
        #[serde(default)]
        pub weather: Vec<Weather>,
        pub wind: Wind,
        /// Probability of precipitation, 0-1
        #[serde(default)]
        pub pop: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct City {
        pub name: String,
        #[serde(default)]
        pub timezone: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub list: Vec<ForecastEntry>,
        pub city: City,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    // 2026-03-10 00:00:00 UTC
    const MIDNIGHT: i64 = 1_773_100_800;

    fn entry(dt: i64, temp: f64, pop: f64) -> serde_json::Value {
        json!({
            "dt": dt,
            "main": {"temp": temp, "feels_like": temp, "temp_min": temp - 1.0, "temp_max": temp + 1.0, "humidity": 60},
            "weather": [{"description": "light rain", "icon": "10d"}],
            "wind": {"speed": 4.0, "deg": 200},
            "pop": pop
        })
    }

    fn forecast(start: i64, count: i64, offset: i64) -> api::ForecastResponse {
        let list: Vec<_> = (0..count)
            .map(|i| entry(start + i * 10_800, 15.0 + (i % 8) as f64, 0.1 * (i % 8) as f64))
            .collect();
        serde_json::from_value(json!({
            "list": list,
            "city": {"name": "Springfield", "timezone": offset}
        }))
        .unwrap()
    }

    fn current(offset: i64) -> api::CurrentResponse {
        serde_json::from_value(json!({
            "weather": [{"description": "scattered clouds", "icon": "03d"}],
            "main": {"temp": 19.5, "feels_like": 18.9, "pressure": 1009, "humidity": 71},
            "visibility": 8500,
            "wind": {"speed": 5.1, "deg": 247.5},
            "sys": {"country": "US", "sunrise": MIDNIGHT + 12 * 3600, "sunset": MIDNIGHT + 23 * 3600 + 1800},
            "timezone": offset,
            "name": "Springfield",
            "dt": MIDNIGHT + 15 * 3600
        }))
        .unwrap()
    }

    #[rstest]
    #[case(MIDNIGHT + 6 * 3600 + 42 * 60, 0, "6:42 AM")]
    #[case(MIDNIGHT + 12 * 3600, -18_000, "7:00 AM")]
    #[case(MIDNIGHT + 20 * 3600 + 5 * 60, 0, "8:05 PM")]
    fn test_local_clock(#[case] epoch: i64, #[case] offset: i64, #[case] expected: &str) {
        assert_eq!(local_clock(epoch, offset), expected);
    }

    #[test]
    fn test_bucket_by_day_groups_by_local_date() {
        let forecast = forecast(MIDNIGHT, 40, 0);
        let days = bucket_by_day(&forecast.list, 0);

        assert_eq!(days.len(), 5);
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
        assert!(days.iter().all(|d| d.source == WeatherSource::OpenWeatherMap));

        let first = &days[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert_eq!(first.timestamp, MIDNIGHT);
        assert!((first.min_temperature - 14.0).abs() < 1e-9);
        assert!((first.max_temperature - 23.0).abs() < 1e-9);
        assert!((first.precipitation_probability - 0.7).abs() < 1e-9);
        assert_eq!(first.humidity, 60);
        assert!(first.uv_index.is_none());
        assert_eq!(first.condition.text, "Light rain");
    }

    #[test]
    fn test_bucket_by_day_respects_utc_offset() {
        // At UTC-05:00 the first two 3-hour samples still fall on the previous local day.
        let forecast = forecast(MIDNIGHT, 16, -18_000);
        let days = bucket_by_day(&forecast.list, -18_000);

        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert_eq!(days.len(), 3);
    }

    #[test]
    fn test_bucket_by_day_caps_at_five_days() {
        // 48 samples at a +12h offset straddle seven local dates.
        let forecast = forecast(MIDNIGHT, 48, 43_200);
        let days = bucket_by_day(&forecast.list, 43_200);
        assert_eq!(days.len(), MAX_FORECAST_DAYS);
    }

    #[test]
    fn test_normalize_current_conversions() {
        let query = LocationQuery::new("Springfield", Some("Illinois"), None).unwrap();
        let result = normalize(current(0), forecast(MIDNIGHT, 40, 0), &query).unwrap();

        assert_eq!(result.source, WeatherSource::OpenWeatherMap);
        assert!((result.current.visibility - 8.5).abs() < 1e-9);
        assert_eq!(result.current.wind_direction, "WSW");
        assert_eq!(result.current.wind_degree, 248);
        assert!(result.current.uv_index.is_none());
        assert_eq!(result.current.sunrise, "12:00 PM");
        assert_eq!(result.current.sunset, "11:30 PM");
        assert!(result.current.is_day);
        assert_eq!(result.current.condition.text, "Scattered clouds");
        assert_eq!(
            result.current.condition.icon,
            "https://openweathermap.org/img/wn/03d@2x.png"
        );
        assert_eq!(result.location.region, "Illinois");
        assert_eq!(result.location.country, "US");
        assert_eq!(result.location.timezone, "UTC");
        assert_eq!(result.hourly.len(), 8);
        assert_eq!(result.daily.len(), 5);
    }

    #[test]
    fn test_night_flag_outside_daylight() {
        let query = LocationQuery::city_only("Springfield").unwrap();
        let mut now = current(0);
        now.dt = MIDNIGHT + 2 * 3600;
        let result = normalize(now, forecast(MIDNIGHT, 8, 0), &query).unwrap();
        assert!(!result.current.is_day);
    }

    #[test]
    fn test_missing_visibility_defaults_to_ten_km() {
        let query = LocationQuery::city_only("Springfield").unwrap();
        let mut now = current(0);
        now.visibility = None;
        let result = normalize(now, forecast(MIDNIGHT, 8, 0), &query).unwrap();
        assert!((result.current.visibility - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_forecast_is_a_parse_error() {
        let query = LocationQuery::city_only("Springfield").unwrap();
        let err = normalize(current(0), forecast(MIDNIGHT, 0, 0), &query).unwrap_err();
        assert!(matches!(err, SaviourError::Parse { .. }));
    }
}
