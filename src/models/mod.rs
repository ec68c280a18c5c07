//! Data models for the weather service
//!
//! - Weather: the unified response shape and unit helpers
//! - Forecast: per-provider results and the rules for combining them

pub mod forecast;
pub mod weather;

pub use forecast::{ProviderResult, extension_days};
pub use weather::{
    Condition, CurrentConditions, DailySummary, ForecastInfo, HourlySample, LocationInfo,
    UnifiedWeatherResponse, WeatherSource,
};
