//! Upstream payload fixtures shared by the integration tests
//!
//! Timestamps are anchored at the current UTC day so the primary provider's
//! "no past hours" filter behaves the same whenever the tests run.

#![allow(dead_code)]

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use saviour_weather::config::{ProviderConfig, WeatherConfig};
use serde_json::{Value, json};

pub const WEATHERAPI_KEY: &str = "test-weatherapi-key";
pub const OPENWEATHER_KEY: &str = "test-openweather-key";

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

pub fn weather_config(base_url: &str) -> WeatherConfig {
    WeatherConfig {
        weatherapi: ProviderConfig {
            api_key: Some(WEATHERAPI_KEY.to_string()),
            base_url: base_url.to_string(),
        },
        openweathermap: ProviderConfig {
            api_key: Some(OPENWEATHER_KEY.to_string()),
            base_url: base_url.to_string(),
        },
        timeout_seconds: 2,
        ..WeatherConfig::default()
    }
}

fn weatherapi_condition() -> Value {
    json!({"text": "Partly cloudy", "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png"})
}

/// `forecast.json` body with `days` forecast days starting today (UTC)
pub fn weatherapi_forecast(city: &str, days: u64) -> Value {
    let start = today();
    let forecastday: Vec<Value> = (0..days)
        .map(|i| {
            let date = start + Days::new(i);
            let day_start = midnight(date);
            let hours: Vec<Value> = (0..24)
                .map(|h: i64| {
                    json!({
                        "time_epoch": day_start + h * 3600,
                        "temp_c": 14.0 + (h as f64) / 2.0,
                        "feelslike_c": 13.0 + (h as f64) / 2.0,
                        "humidity": 65,
                        "wind_kph": 10.8,
                        "chance_of_rain": 20,
                        "uv": 3.0,
                        "condition": weatherapi_condition()
                    })
                })
                .collect();
            json!({
                "date": date.to_string(),
                "date_epoch": day_start,
                "day": {
                    "maxtemp_c": 24.0,
                    "mintemp_c": 12.0,
                    "maxwind_kph": 18.0,
                    "avghumidity": 62.0,
                    "daily_chance_of_rain": 30,
                    "uv": 5.0,
                    "condition": weatherapi_condition()
                },
                "astro": {"sunrise": "06:41 AM", "sunset": "07:12 PM"},
                "hour": hours
            })
        })
        .collect();

    json!({
        "location": {
            "name": city,
            "region": "Illinois",
            "country": "United States of America",
            "tz_id": "UTC",
            "localtime_epoch": Utc::now().timestamp()
        },
        "current": {
            "temp_c": 21.0,
            "feelslike_c": 20.4,
            "humidity": 58,
            "pressure_mb": 1014.0,
            "wind_kph": 14.4,
            "wind_degree": 225,
            "wind_dir": "SW",
            "vis_km": 10.0,
            "uv": 4.0,
            "is_day": 1,
            "condition": weatherapi_condition()
        },
        "forecast": {"forecastday": forecastday}
    })
}

/// OpenWeatherMap `/weather` body
pub fn openweather_current(city: &str) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "weather": [{"description": "overcast clouds", "icon": "04d"}],
        "main": {"temp": 17.2, "feels_like": 16.8, "pressure": 1011, "humidity": 74},
        "visibility": 9000,
        "wind": {"speed": 3.6, "deg": 90},
        "sys": {"country": "US", "sunrise": now - 3600, "sunset": now + 3600},
        "timezone": 0,
        "name": city,
        "dt": now
    })
}

/// OpenWeatherMap `/forecast` body: 3-hour samples covering `days` whole UTC days from today
pub fn openweather_forecast(city: &str, days: i64) -> Value {
    openweather_forecast_at(city, days, 0)
}

/// Same samples as [`openweather_forecast`], reported for a city `utc_offset` seconds from UTC
pub fn openweather_forecast_at(city: &str, days: i64, utc_offset: i64) -> Value {
    let start = midnight(today());
    let list: Vec<Value> = (0..days * 8)
        .map(|i| {
            json!({
                "dt": start + i * 10_800,
                "main": {
                    "temp": 15.0,
                    "feels_like": 14.5,
                    "temp_min": 11.0 + (i % 8) as f64,
                    "temp_max": 13.0 + (i % 8) as f64,
                    "humidity": 70
                },
                "weather": [{"description": "light rain", "icon": "10d"}],
                "wind": {"speed": 4.2, "deg": 180},
                "pop": 0.35
            })
        })
        .collect();

    json!({
        "list": list,
        "city": {"name": city, "timezone": utc_offset}
    })
}
