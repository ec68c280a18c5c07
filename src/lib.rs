//! `Saviour` weather - multi-source weather aggregation service
//!
//! Combines a short-horizon primary provider with a longer-horizon secondary
//! provider into one unified forecast, and degrades to synthetic demo data
//! when neither is reachable.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod location;
pub mod models;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use cache::PersistentCache;
pub use config::SaviourConfig;
pub use error::SaviourError;
pub use location::LocationQuery;
pub use models::{UnifiedWeatherResponse, WeatherSource};
pub use weather::{ForecastStrategy, WeatherAggregator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SaviourError>;
