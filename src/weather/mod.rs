//! Multi-source weather aggregation
//!
//! The fallback order is an ordered list of [`ForecastStrategy`] values. The
//! first strategy that yields a response wins; when none does, synthetic
//! data is served so callers always get something renderable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use tracing::{debug, info, warn};

use crate::cache::PersistentCache;
use crate::config::WeatherConfig;
use crate::location::LocationQuery;
use crate::models::{UnifiedWeatherResponse, extension_days};
use crate::Result;

pub mod client;
pub mod mock;
pub mod openweathermap;
pub mod weatherapi;

pub use client::UpstreamClient;
pub use openweathermap::OpenWeatherMapProvider;
pub use weatherapi::WeatherApiProvider;

/// One step of the fallback chain
#[async_trait]
pub trait ForecastStrategy: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    /// Produce a response, or `None` to hand over to the next strategy.
    ///
    /// Implementations absorb and log their own failures.
    async fn attempt(&self, query: &LocationQuery) -> Option<UnifiedWeatherResponse>;
}

/// Primary provider, extended with secondary days beyond its horizon
#[derive(Debug, Clone)]
pub struct PrimaryWithExtension {
    primary: WeatherApiProvider,
    secondary: OpenWeatherMapProvider,
}

impl PrimaryWithExtension {
    #[must_use]
    pub fn new(primary: WeatherApiProvider, secondary: OpenWeatherMapProvider) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl ForecastStrategy for PrimaryWithExtension {
    fn name(&self) -> &'static str {
        weatherapi::PROVIDER
    }

    async fn attempt(&self, query: &LocationQuery) -> Option<UnifiedWeatherResponse> {
        if !self.primary.is_configured() {
            debug!("No {} credentials configured, skipping", weatherapi::PROVIDER);
            return None;
        }

        let primary = match self.primary.fetch(query).await {
            Ok(result) => result,
            Err(e) => {
                warn!(provider = weatherapi::PROVIDER, "Primary provider unavailable: {}", e);
                return None;
            }
        };

        if !self.secondary.is_configured() {
            return Some(primary.into_response());
        }

        // Skip count is derived from the primary result.
        let extension = match self.secondary.fetch_daily(query).await {
            Ok(buckets) => extension_days(buckets, primary.daily.len(), primary.last_day()),
            Err(e) => {
                warn!(
                    provider = openweathermap::PROVIDER,
                    "Forecast extension unavailable: {}", e
                );
                Vec::new()
            }
        };

        Some(primary.combine(extension))
    }
}

/// Secondary provider as the sole source
#[derive(Debug, Clone)]
pub struct SecondaryOnly {
    secondary: OpenWeatherMapProvider,
}

impl SecondaryOnly {
    #[must_use]
    pub fn new(secondary: OpenWeatherMapProvider) -> Self {
        Self { secondary }
    }
}

#[async_trait]
impl ForecastStrategy for SecondaryOnly {
    fn name(&self) -> &'static str {
        openweathermap::PROVIDER
    }

    async fn attempt(&self, query: &LocationQuery) -> Option<UnifiedWeatherResponse> {
        if !self.secondary.is_configured() {
            debug!("No {} credentials configured, skipping", openweathermap::PROVIDER);
            return None;
        }

        match self.secondary.fetch(query).await {
            Ok(result) => Some(result.into_response()),
            Err(e) => {
                warn!(provider = openweathermap::PROVIDER, "Secondary provider unavailable: {}", e);
                None
            }
        }
    }
}

/// Synthetic response for `query` at the current server time
#[must_use]
pub fn fallback_response(query: &LocationQuery) -> UnifiedWeatherResponse {
    mock::synthesize(query, Local::now().fixed_offset()).into_response()
}

/// Runs the fallback chain for a location
pub struct WeatherAggregator {
    strategies: Vec<Box<dyn ForecastStrategy>>,
}

impl std::fmt::Debug for WeatherAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("WeatherAggregator")
            .field("strategies", &names)
            .finish()
    }
}

impl WeatherAggregator {
    /// Build the standard chain: primary with extension, then secondary alone.
    pub fn from_config(
        config: &WeatherConfig,
        cache: Option<Arc<PersistentCache>>,
        cache_ttl: Duration,
    ) -> Result<Self> {
        let mut client = UpstreamClient::new(Duration::from_secs(config.timeout_seconds))?;
        if let Some(cache) = cache {
            client = client.with_cache(cache, cache_ttl);
        }

        let primary = WeatherApiProvider::new(
            client.clone(),
            config.weatherapi.clone(),
            config.forecast_days,
            config.hourly_limit,
        );
        let secondary = OpenWeatherMapProvider::new(client, config.openweathermap.clone());

        info!(
            "Weather providers: {}={}, {}={}",
            weatherapi::PROVIDER,
            if primary.is_configured() { "configured" } else { "missing key" },
            openweathermap::PROVIDER,
            if secondary.is_configured() { "configured" } else { "missing key" },
        );

        Ok(Self::with_strategies(vec![
            Box::new(PrimaryWithExtension::new(primary, secondary.clone())),
            Box::new(SecondaryOnly::new(secondary)),
        ]))
    }

    #[must_use]
    pub fn with_strategies(strategies: Vec<Box<dyn ForecastStrategy>>) -> Self {
        Self { strategies }
    }

    /// Weather for `query`. Never fails; degrades to synthetic data.
    pub async fn get_weather(&self, query: &LocationQuery) -> UnifiedWeatherResponse {
        for strategy in &self.strategies {
            if let Some(response) = strategy.attempt(query).await {
                debug!("Weather served by {} strategy", strategy.name());
                return response;
            }
        }

        warn!(
            location = %query.to_query_string(),
            "All weather providers unavailable, serving demo data"
        );
        fallback_response(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::models::WeatherSource;
    use crate::models::forecast::fixtures::{days_from, provider_result};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(Option<UnifiedWeatherResponse>, Arc<AtomicUsize>);

    #[async_trait]
    impl ForecastStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn attempt(&self, _query: &LocationQuery) -> Option<UnifiedWeatherResponse> {
            self.1.fetch_add(1, Ordering::SeqCst);
            self.0.clone()
        }
    }

    fn openweather_response() -> UnifiedWeatherResponse {
        let start = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        provider_result(
            WeatherSource::OpenWeatherMap,
            days_from(start, 5, WeatherSource::OpenWeatherMap),
        )
        .into_response()
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let aggregator = WeatherAggregator::with_strategies(vec![
            Box::new(Fixed(None, calls.clone())),
            Box::new(Fixed(Some(openweather_response()), calls.clone())),
            Box::new(Fixed(None, calls.clone())),
        ]);

        let query = LocationQuery::city_only("Springfield").unwrap();
        let response = aggregator.get_weather(&query).await;

        assert_eq!(response.source, WeatherSource::OpenWeatherMap);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausted_chain_serves_mock() {
        let calls = Arc::new(AtomicUsize::new(0));
        let aggregator = WeatherAggregator::with_strategies(vec![Box::new(Fixed(None, calls))]);

        let query = LocationQuery::city_only("Springfield").unwrap();
        let response = aggregator.get_weather(&query).await;

        assert_eq!(response.source, WeatherSource::Mock);
        assert_eq!(response.location.name, "Springfield");
        assert_eq!(response.hourly.len(), 24);
        assert_eq!(response.daily.len(), 5);
    }

    #[tokio::test]
    async fn test_no_credentials_falls_through_to_mock() {
        let config = WeatherConfig {
            weatherapi: ProviderConfig {
                api_key: None,
                base_url: "http://127.0.0.1:9".to_string(),
            },
            openweathermap: ProviderConfig {
                api_key: Some(String::new()),
                base_url: "http://127.0.0.1:9".to_string(),
            },
            ..WeatherConfig::default()
        };
        let aggregator = WeatherAggregator::from_config(&config, None, Duration::ZERO).unwrap();

        let query = LocationQuery::city_only("Springfield").unwrap();
        let response = aggregator.get_weather(&query).await;

        assert_eq!(response.source, WeatherSource::Mock);
        assert!(response.forecast_info.message.contains("Demo data"));
    }

    #[test]
    fn test_debug_lists_strategy_order() {
        let config = WeatherConfig::default();
        let aggregator = WeatherAggregator::from_config(&config, None, Duration::ZERO).unwrap();
        let debug = format!("{aggregator:?}");
        assert!(debug.contains("[\"weatherapi\", \"openweathermap\"]"));
    }
}
