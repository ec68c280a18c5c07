//! Provider results and forecast combination
//!
//! A [`ProviderResult`] is what a single upstream adapter produces. The
//! functions here turn one or two of them into an [`UnifiedWeatherResponse`]
//! without touching the network, so every combination rule is testable on
//! plain values.

use chrono::NaiveDate;

use super::weather::{
    CurrentConditions, DailySummary, ForecastInfo, HourlySample, LocationInfo,
    UnifiedWeatherResponse, WeatherSource,
};

/// Normalized output of one upstream provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResult {
    pub source: WeatherSource,
    pub location: LocationInfo,
    pub current: CurrentConditions,
    /// Chronological, never in the past
    pub hourly: Vec<HourlySample>,
    /// Chronological, each tagged with `source`
    pub daily: Vec<DailySummary>,
}

impl ProviderResult {
    /// Last calendar date covered by the daily forecast
    #[must_use]
    pub fn last_day(&self) -> Option<NaiveDate> {
        self.daily.last().map(|d| d.date)
    }

    /// Wrap a single provider's data as a response
    #[must_use]
    pub fn into_response(self) -> UnifiedWeatherResponse {
        let days = self.daily.len();
        let (weather_api_days, open_weather_days, message) = match self.source {
            WeatherSource::WeatherApi => (days, 0, format!("{days}-day forecast from WeatherAPI")),
            WeatherSource::OpenWeatherMap => (
                0,
                days,
                format!("{days}-day forecast from OpenWeatherMap (WeatherAPI unavailable)"),
            ),
            WeatherSource::Mock => (
                0,
                0,
                "Demo data: live weather services are currently unavailable".to_string(),
            ),
            WeatherSource::Combined => (days, 0, format!("{days}-day combined forecast")),
        };

        UnifiedWeatherResponse {
            source: self.source,
            forecast_info: ForecastInfo {
                total_days: days,
                weather_api_days,
                open_weather_days,
                message,
            },
            location: self.location,
            current: self.current,
            hourly: self.hourly,
            daily: self.daily,
        }
    }

    /// Append secondary-provider days to a primary result.
    ///
    /// Returns the primary-only response unchanged when `extension` is empty.
    #[must_use]
    pub fn combine(self, extension: Vec<DailySummary>) -> UnifiedWeatherResponse {
        if extension.is_empty() {
            return self.into_response();
        }

        let primary_days = self.daily.len();
        let extra_days = extension.len();
        let mut daily = self.daily;
        daily.extend(extension);
        let total_days = daily.len();

        let message = format!(
            "Days 1-{primary_days} from {}, days {}-{total_days} from {}",
            self.source.display_name(),
            primary_days + 1,
            WeatherSource::OpenWeatherMap.display_name(),
        );

        UnifiedWeatherResponse {
            source: WeatherSource::Combined,
            forecast_info: ForecastInfo {
                total_days,
                weather_api_days: primary_days,
                open_weather_days: extra_days,
                message,
            },
            location: self.location,
            current: self.current,
            hourly: self.hourly,
            daily,
        }
    }
}

/// Select the secondary-provider days that extend a primary forecast.
///
/// The first `primary_days` buckets are skipped; anything still dated on or
/// before `primary_last_day` is dropped as well, so the merged forecast never
/// repeats a calendar day.
#[must_use]
pub fn extension_days(
    buckets: Vec<DailySummary>,
    primary_days: usize,
    primary_last_day: Option<NaiveDate>,
) -> Vec<DailySummary> {
    buckets
        .into_iter()
        .skip(primary_days)
        .filter(|day| primary_last_day.is_none_or(|last| day.date > last))
        .collect()
}
