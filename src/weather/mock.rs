//! Synthetic terminal fallback
//!
//! Produces a fixed-shape, randomized dataset (24 hourly samples, 5 days)
//! from nothing but the city name and the server clock. No I/O, no errors.

use chrono::{DateTime, Days, FixedOffset, NaiveTime, Timelike};
use rand::RngExt;

use crate::location::LocationQuery;
use crate::models::weather::{
    Condition, CurrentConditions, DailySummary, HourlySample, LocationInfo, MAX_HOURLY_SAMPLES,
    utc_offset_label, wind_direction_to_cardinal,
};
use crate::models::{ProviderResult, WeatherSource};

pub const HOURLY_SAMPLES: usize = MAX_HOURLY_SAMPLES;
pub const DAILY_SAMPLES: u64 = 5;

const SUNRISE_HOUR: u32 = 6;
const SUNSET_HOUR: u32 = 19;

/// (description, WeatherAPI icon code)
const CONDITIONS: [(&str, u16); 5] = [
    ("Sunny", 113),
    ("Partly cloudy", 116),
    ("Cloudy", 119),
    ("Light rain", 296),
    ("Patchy rain possible", 176),
];

fn is_daylight(hour: u32) -> bool {
    (SUNRISE_HOUR..SUNSET_HOUR).contains(&hour)
}

fn pick_condition<R: RngExt + ?Sized>(rng: &mut R, daylight: bool) -> Condition {
    let (text, code) = CONDITIONS[rng.random_range(0..CONDITIONS.len())];
    let (text, period) = match (daylight, code) {
        (false, 113) => ("Clear", "night"),
        (false, _) => (text, "night"),
        (true, _) => (text, "day"),
    };
    Condition {
        text: text.to_string(),
        icon: format!("https://cdn.weatherapi.com/weather/128x128/{period}/{code}.png"),
    }
}

/// Build the demo dataset for `query` as seen at `now`.
#[must_use]
pub fn synthesize(query: &LocationQuery, now: DateTime<FixedOffset>) -> ProviderResult {
    let mut rng = rand::rng();
    let hour = now.hour();
    let daylight = is_daylight(hour);

    let temperature: f64 = rng.random_range(12.0..28.0);
    let wind_degree: u16 = rng.random_range(0..360);

    let current = CurrentConditions {
        temperature,
        feels_like: temperature + rng.random_range(-2.0..2.0),
        humidity: rng.random_range(40..=85),
        pressure: rng.random_range(1005.0..1025.0),
        wind_speed: rng.random_range(0.5..8.0),
        wind_direction: wind_direction_to_cardinal(f64::from(wind_degree)).to_string(),
        wind_degree,
        uv_index: Some(if daylight { rng.random_range(1.0..8.0) } else { 0.0 }),
        visibility: 10.0,
        condition: pick_condition(&mut rng, daylight),
        sunrise: "6:00 AM".to_string(),
        sunset: "7:00 PM".to_string(),
        is_day: daylight,
    };

    let hour_start = now.timestamp() - i64::from(now.minute() * 60 + now.second());
    let hourly = (0..HOURLY_SAMPLES)
        .map(|i| {
            let local_hour = (hour as usize + i) % 24;
            let daylight = is_daylight(local_hour as u32);
            let swing = if daylight { 2.0 } else { -3.0 };
            let temperature = temperature + swing + rng.random_range(-1.5..1.5);
            HourlySample {
                timestamp: hour_start + (i as i64) * 3600,
                temperature,
                feels_like: Some(temperature - rng.random_range(0.0..2.0)),
                humidity: rng.random_range(40..=90),
                wind_speed: rng.random_range(0.5..8.0),
                precipitation_probability: rng.random_range(0.0..0.6),
                uv_index: Some(if daylight { rng.random_range(0.0..8.0) } else { 0.0 }),
                condition: pick_condition(&mut rng, daylight),
            }
        })
        .collect();

    let today = now.date_naive();
    let daily = (0..DAILY_SAMPLES)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .map(|date| {
            let min_temperature = rng.random_range(8.0..16.0);
            DailySummary {
                timestamp: date.and_time(NaiveTime::MIN).and_utc().timestamp(),
                date,
                min_temperature,
                max_temperature: min_temperature + rng.random_range(5.0..12.0),
                humidity: rng.random_range(40..=85),
                wind_speed: rng.random_range(0.5..8.0),
                precipitation_probability: rng.random_range(0.0..0.8),
                uv_index: Some(rng.random_range(1.0..8.0)),
                sunrise: Some("6:00 AM".to_string()),
                sunset: Some("7:00 PM".to_string()),
                source: WeatherSource::Mock,
                condition: pick_condition(&mut rng, true),
            }
        })
        .collect();

    ProviderResult {
        source: WeatherSource::Mock,
        location: LocationInfo {
            name: query.city().to_string(),
            region: query.state().unwrap_or_default().to_string(),
            country: query.country().unwrap_or_default().to_string(),
            timezone: utc_offset_label(i64::from(now.offset().local_minus_utc())),
        },
        current,
        hourly,
        daily,
    }
}
