//! Shared HTTP client for upstream weather providers
//!
//! Single attempt per call, bounded by the configured timeout. Successful
//! response bodies are cached for a short window when a cache is configured.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::RngExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::cache::PersistentCache;
use crate::{Result, SaviourError};

/// Query parameters whose values must never reach logs or errors
const SECRET_PARAMS: [&str; 2] = ["key", "appid"];

#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    cache: Option<Arc<PersistentCache>>,
    cache_ttl: Duration,
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("cached", &self.cache.is_some())
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}

impl UpstreamClient {
    /// Create a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("saviour-weather/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SaviourError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            cache: None,
            cache_ttl: Duration::ZERO,
        })
    }

    /// Cache successful responses in `cache` for up to `ttl`.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<PersistentCache>, ttl: Duration) -> Self {
        if !ttl.is_zero() {
            self.cache = Some(cache);
            self.cache_ttl = ttl;
        }
        self
    }

    /// GET `url` and decode the JSON body into `T`.
    ///
    /// `cache_key` identifies the request without its credentials.
    #[instrument(skip(self, url), fields(url = %redact(url)))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, cache_key: &str) -> Result<T> {
        if let Some(body) = self.cached_body(cache_key).await {
            match serde_json::from_str(&body) {
                Ok(value) => {
                    debug!("Serving upstream response from cache");
                    return Ok(value);
                }
                Err(e) => warn!("Discarding undecodable cache entry: {}", e),
            }
        }

        let start_time = Instant::now();
        let response = self.http.get(url).send().await.map_err(|e| {
            let kind = if e.is_timeout() { "timed out" } else { "failed" };
            SaviourError::api(format!("Request {kind}: {}", e.without_url()))
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            return Err(SaviourError::api(format!(
                "Upstream returned {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SaviourError::api(format!("Failed to read body: {}", e.without_url())))?;

        let value = serde_json::from_str(&body).map_err(|e| SaviourError::parse(e.to_string()))?;

        self.store_body(cache_key, body).await;
        Ok(value)
    }

    async fn cached_body(&self, cache_key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        match cache.get::<String>(cache_key).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Cache read failed for {}: {}", cache_key, e);
                None
            }
        }
    }

    async fn store_body(&self, cache_key: &str, body: String) {
        let Some(cache) = &self.cache else {
            return;
        };

        // Jitter only shortens the window, so entries never outlive the TTL.
        let jitter: f64 = rand::rng().random_range(0.8..1.0);
        let ttl = self.cache_ttl.mul_f64(jitter);

        if let Err(e) = cache.put(cache_key, body, ttl).await {
            warn!("Cache write failed for {}: {}", cache_key, e);
        }
    }
}

/// Replace credential query values with `***`
#[must_use]
pub fn redact(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if SECRET_PARAMS.contains(&name) => format!("{name}=***"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{base}?{query}")
}
