//! WeatherAPI.com adapter (primary provider)
//!
//! Short-horizon, high-fidelity forecast: current conditions, hourly samples
//! and up to three days on the free tier. Wind speeds arrive in km/h and are
//! converted to m/s; icons are upgraded to the 128px variant.

use tracing::{debug, instrument};

use super::client::UpstreamClient;
use crate::config::ProviderConfig;
use crate::location::LocationQuery;
use crate::models::weather::{
    Condition, CurrentConditions, DailySummary, HourlySample, LocationInfo, MAX_HOURLY_SAMPLES,
    humidity_percent, kph_to_ms, percent_to_probability,
};
use crate::models::{ProviderResult, WeatherSource};
use crate::{Result, SaviourError};

pub const PROVIDER: &str = "weatherapi";

const SECONDS_PER_HOUR: i64 = 3600;

/// Client for the WeatherAPI.com forecast endpoint
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    client: UpstreamClient,
    config: ProviderConfig,
    forecast_days: u8,
    hourly_limit: usize,
}

impl WeatherApiProvider {
    #[must_use]
    pub fn new(
        client: UpstreamClient,
        config: ProviderConfig,
        forecast_days: u8,
        hourly_limit: usize,
    ) -> Self {
        Self {
            client,
            config,
            forecast_days,
            hourly_limit,
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.key().is_some()
    }

    fn forecast_url(&self, api_key: &str, location: &str) -> String {
        format!(
            "{}/forecast.json?key={}&q={}&days={}&aqi=no&alerts=no",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(api_key),
            urlencoding::encode(location),
            self.forecast_days
        )
    }

    /// Fetch and normalize the forecast for `query`.
    #[instrument(skip(self), fields(location = %query.to_query_string()))]
    pub async fn fetch(&self, query: &LocationQuery) -> Result<ProviderResult> {
        let api_key = self
            .config
            .key()
            .ok_or_else(|| SaviourError::missing_credentials(PROVIDER))?;

        let url = self.forecast_url(api_key, &query.to_query_string());
        let response: api::ForecastResponse = self
            .client
            .get_json(&url, &query.cache_key("weatherapi:forecast"))
            .await?;

        let result = normalize(response, self.hourly_limit)?;
        debug!(
            "WeatherAPI returned {} days, {} hourly samples",
            result.daily.len(),
            result.hourly.len()
        );
        Ok(result)
    }
}

/// Upgrade a WeatherAPI icon path to an absolute 128px URL
#[must_use]
pub fn icon_url(icon: &str) -> String {
    let icon = icon.replace("64x64", "128x128");
    if icon.starts_with("//") {
        format!("https:{icon}")
    } else {
        icon
    }
}

/// `"06:45 AM"` -> `"6:45 AM"`
fn local_time(value: &str) -> String {
    value.strip_prefix('0').unwrap_or(value).to_string()
}

fn condition(raw: &api::Condition) -> Condition {
    Condition {
        text: raw.text.clone(),
        icon: icon_url(&raw.icon),
    }
}

/// Convert a WeatherAPI forecast response into a provider result.
///
/// Hourly samples are taken across all forecast days, starting with the hour
/// that contains the location's local time, and capped at `hourly_limit`
/// (never more than [`MAX_HOURLY_SAMPLES`]).
pub fn normalize(response: api::ForecastResponse, hourly_limit: usize) -> Result<ProviderResult> {
    let api::ForecastResponse {
        location,
        current,
        forecast,
    } = response;

    let today = forecast
        .forecastday
        .first()
        .ok_or_else(|| SaviourError::parse("WeatherAPI response has no forecast days"))?;

    let current = CurrentConditions {
        temperature: current.temp_c,
        feels_like: current.feelslike_c,
        humidity: humidity_percent(current.humidity),
        pressure: current.pressure_mb,
        wind_speed: kph_to_ms(current.wind_kph),
        wind_direction: current.wind_dir.clone(),
        wind_degree: current.wind_degree,
        uv_index: current.uv,
        visibility: current.vis_km,
        condition: condition(&current.condition),
        sunrise: local_time(&today.astro.sunrise),
        sunset: local_time(&today.astro.sunset),
        is_day: current.is_day == 1,
    };

    let now = location.localtime_epoch;
    let hourly = forecast
        .forecastday
        .iter()
        .flat_map(|day| day.hour.iter())
        .filter(|hour| hour.time_epoch + SECONDS_PER_HOUR > now)
        .take(hourly_limit.min(MAX_HOURLY_SAMPLES))
        .map(|hour| HourlySample {
            timestamp: hour.time_epoch,
            temperature: hour.temp_c,
            feels_like: hour.feelslike_c,
            humidity: humidity_percent(hour.humidity),
            wind_speed: kph_to_ms(hour.wind_kph),
            precipitation_probability: percent_to_probability(hour.chance_of_rain),
            uv_index: hour.uv,
            condition: condition(&hour.condition),
        })
        .collect();

    let daily = forecast
        .forecastday
        .iter()
        .map(|day| DailySummary {
            timestamp: day.date_epoch,
            date: day.date,
            min_temperature: day.day.mintemp_c,
            max_temperature: day.day.maxtemp_c,
            humidity: humidity_percent(day.day.avghumidity),
            wind_speed: kph_to_ms(day.day.maxwind_kph),
            precipitation_probability: percent_to_probability(day.day.daily_chance_of_rain),
            uv_index: day.day.uv,
            sunrise: Some(local_time(&day.astro.sunrise)),
            sunset: Some(local_time(&day.astro.sunset)),
            source: WeatherSource::WeatherApi,
            condition: condition(&day.day.condition),
        })
        .collect();

    Ok(ProviderResult {
        source: WeatherSource::WeatherApi,
        location: LocationInfo {
            name: location.name,
            region: location.region,
            country: location.country,
            timezone: location.tz_id,
        },
        current,
        hourly,
        daily,
    })
}

/// WeatherAPI.com `forecast.json` response structures
pub mod api {
    use chrono::NaiveDate;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub location: Location,
        pub current: Current,
        pub forecast: Forecast,
    }

    #[derive(Debug, Deserialize)]
    pub struct Location {
        pub name: String,
        #[serde(default)]
        pub region: String,
        #[serde(default)]
        pub country: String,
        #[serde(default)]
        pub tz_id: String,
        pub localtime_epoch: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub text: String,
        pub icon: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Current {
        pub temp_c: f64,
        pub feelslike_c: f64,
        pub humidity: f64,
        pub pressure_mb: f64,
        pub wind_kph: f64,
        pub wind_degree: u16,
        pub wind_dir: String,
        pub vis_km: f64,
        #[serde(default)]
        pub uv: Option<f64>,
        pub is_day: u8,
        pub condition: Condition,
    }

    #[derive(Debug, Deserialize)]
    pub struct Forecast {
        pub forecastday: Vec<ForecastDay>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastDay {
        pub date: NaiveDate,
        pub date_epoch: i64,
        pub day: Day,
        pub astro: Astro,
        #[serde(default)]
        pub hour: Vec<Hour>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Day {
        pub maxtemp_c: f64,
        pub mintemp_c: f64,
        pub maxwind_kph: f64,
        pub avghumidity: f64,
        #[serde(default)]
        pub daily_chance_of_rain: f64,
        #[serde(default)]
        pub uv: Option<f64>,
        pub condition: Condition,
    }

    #[derive(Debug, Deserialize)]
    pub struct Astro {
        pub sunrise: String,
        pub sunset: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Hour {
        pub time_epoch: i64,
        pub temp_c: f64,
        #[serde(default)]
        pub feelslike_c: Option<f64>,
        pub humidity: f64,
        pub wind_kph: f64,
        #[serde(default)]
        pub chance_of_rain: f64,
        #[serde(default)]
        pub uv: Option<f64>,
        pub condition: Condition,
    }
}
