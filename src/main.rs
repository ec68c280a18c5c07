use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use saviour_weather::{AppState, PersistentCache, SaviourConfig, WeatherAggregator, telemetry, web};

/// Multi-source weather aggregation service
#[derive(Debug, Parser)]
#[command(name = "saviour-weather", version, about)]
struct Cli {
    /// Path to a TOML config file (default: ./config.toml if present)
    #[arg(short, long, env = "SAVIOUR_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,
}

fn open_cache(config: &SaviourConfig) -> Option<Arc<PersistentCache>> {
    if !config.cache.enabled {
        return None;
    }
    match PersistentCache::open(&config.cache.location) {
        Ok(cache) => Some(Arc::new(cache)),
        Err(e) => {
            warn!(
                "Response cache unavailable at {}, continuing without it: {:#}",
                config.cache.location, e
            );
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = SaviourConfig::load_from_path(cli.config)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    let _telemetry = telemetry::init(&config.logging)?;
    info!("Starting saviour-weather {}", saviour_weather::VERSION);

    let cache = open_cache(&config);
    let aggregator = WeatherAggregator::from_config(
        &config.weather,
        cache,
        Duration::from_secs(config.cache.ttl_seconds),
    )?;

    web::run(&config.server, AppState::new(aggregator)).await
}
