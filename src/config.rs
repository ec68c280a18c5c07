//! Configuration management for the Saviour weather service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::SaviourError;
use crate::models::weather::MAX_HOURLY_SAMPLES;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Conventional variable holding the WeatherAPI.com key
pub const WEATHERAPI_KEY_VAR: &str = "WEATHER_API_KEY";
/// Conventional variable holding the OpenWeatherMap key
pub const OPENWEATHER_KEY_VAR: &str = "OPENWEATHER_API_KEY";

/// Longest sequential run of upstream calls a single request can make
const UPSTREAM_CALLS_PER_REQUEST: u64 = 3;

/// Root configuration structure for the weather service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaviourConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Directory with the UI bundle served for non-API paths
    #[serde(default)]
    pub static_dir: Option<String>,
    /// TLS certificate/key; plain HTTP when absent
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert_path: String,
    pub key_path: String,
}

/// Credentials and endpoint of one upstream provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key; the provider is skipped when absent
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL for the provider API; empty means the provider's default
    #[serde(default)]
    pub base_url: String,
}

impl ProviderConfig {
    /// The configured key, treating an empty string as absent
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Primary, short-horizon provider (WeatherAPI.com)
    #[serde(default = "default_weatherapi")]
    pub weatherapi: ProviderConfig,
    /// Secondary, longer-horizon provider (OpenWeatherMap)
    #[serde(default = "default_openweathermap")]
    pub openweathermap: ProviderConfig,
    /// Per-request upstream timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u64,
    /// Days requested from the primary provider
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,
    /// Maximum number of hourly samples returned
    #[serde(default = "default_hourly_limit")]
    pub hourly_limit: usize,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Cache TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP collector endpoint; trace export is off when absent
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_weatherapi_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_openweathermap_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weatherapi() -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        base_url: default_weatherapi_base_url(),
    }
}

fn default_openweathermap() -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        base_url: default_openweathermap_base_url(),
    }
}

fn default_weather_timeout() -> u64 {
    8
}

fn default_forecast_days() -> u8 {
    3
}

fn default_hourly_limit() -> usize {
    24
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_cache_location() -> String {
    ".cache/saviour".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            static_dir: None,
            tls: None,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            weatherapi: default_weatherapi(),
            openweathermap: default_openweathermap(),
            timeout_seconds: default_weather_timeout(),
            forecast_days: default_forecast_days(),
            hourly_limit: default_hourly_limit(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_seconds: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl SaviourConfig {
    /// Load configuration from `config.toml` (if present) and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. SAVIOUR_WEATHER__WEATHERAPI__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("SAVIOUR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SaviourConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_credentials(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Fill provider keys missing from the config from the conventional
    /// credential variables.
    pub fn apply_env_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.weather.weatherapi.key().is_none() {
            self.weather.weatherapi.api_key = lookup(WEATHERAPI_KEY_VAR).filter(|k| !k.is_empty());
        }
        if self.weather.openweathermap.key().is_none() {
            self.weather.openweathermap.api_key =
                lookup(OPENWEATHER_KEY_VAR).filter(|k| !k.is_empty());
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.weather.weatherapi.base_url.is_empty() {
            self.weather.weatherapi.base_url = default_weatherapi_base_url();
        }
        if self.weather.openweathermap.base_url.is_empty() {
            self.weather.openweathermap.base_url = default_openweathermap_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.forecast_days == 0 {
            self.weather.forecast_days = default_forecast_days();
        }
        if self.weather.hourly_limit == 0 {
            self.weather.hourly_limit = default_hourly_limit();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        // Both keys are optional; a missing key just disables that provider.
        for (name, provider) in [
            ("WeatherAPI", &self.weather.weatherapi),
            ("OpenWeatherMap", &self.weather.openweathermap),
        ] {
            let Some(api_key) = provider.key() else {
                continue;
            };

            if api_key.len() < 8 {
                return Err(SaviourError::config(format!(
                    "{name} API key appears to be invalid (too short). Please check your API key."
                ))
                .into());
            }

            if api_key.len() > 100 {
                return Err(SaviourError::config(format!(
                    "{name} API key appears to be invalid (too long). Please check your API key."
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(SaviourError::config("Server port cannot be 0").into());
        }

        if !(1..=60).contains(&self.weather.timeout_seconds) {
            return Err(SaviourError::config(
                "Weather API timeout must be between 1 and 60 seconds",
            )
            .into());
        }

        // Primary, then secondary current + forecast, all run back to back.
        let worst_case_chain = UPSTREAM_CALLS_PER_REQUEST * self.weather.timeout_seconds;
        if self.server.request_timeout_seconds <= worst_case_chain {
            return Err(SaviourError::config(format!(
                "Request timeout ({}s) must exceed {} upstream timeouts ({}s)",
                self.server.request_timeout_seconds, UPSTREAM_CALLS_PER_REQUEST, worst_case_chain
            ))
            .into());
        }

        if !(1..=3).contains(&self.weather.forecast_days) {
            return Err(SaviourError::config(
                "WeatherAPI forecast days must be between 1 and 3 (free tier limit)",
            )
            .into());
        }

        if self.weather.hourly_limit > MAX_HOURLY_SAMPLES {
            return Err(SaviourError::config(format!(
                "Hourly limit cannot exceed {MAX_HOURLY_SAMPLES} samples"
            ))
            .into());
        }

        if self.cache.ttl_seconds > 3600 {
            return Err(SaviourError::config("Cache TTL cannot exceed 3600 seconds (1 hour)").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SaviourError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SaviourError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("WeatherAPI", &self.weather.weatherapi.base_url),
            ("OpenWeatherMap", &self.weather.openweathermap.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SaviourError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
