use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde_json::{Value, json};
use tracing::{debug, error};

use crate::location::LocationQuery;
use crate::models::UnifiedWeatherResponse;
use crate::weather::{WeatherAggregator, fallback_response};
use crate::SaviourError;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub aggregator: Arc<WeatherAggregator>,
}

impl AppState {
    #[must_use]
    pub fn new(aggregator: WeatherAggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct WeatherParams {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl WeatherParams {
    /// Collect the recognized parameters, keeping the first value of each.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "city" => &mut params.city,
                "state" => &mut params.state,
                "country" => &mut params.country,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }
}

/// JSON error body `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(SaviourError);

impl From<SaviourError> for ApiError {
    fn from(err: SaviourError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(get_weather))
        .route("/health", get(health))
        .with_state(state)
}

async fn get_weather(
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<UnifiedWeatherResponse>, ApiError> {
    let params = match pairs {
        Ok(Query(pairs)) => WeatherParams::from_pairs(pairs),
        Err(rejection) => {
            debug!("Unreadable query string: {}", rejection);
            WeatherParams::default()
        }
    };

    let query = LocationQuery::new(
        params.city.as_deref().unwrap_or_default(),
        params.state.as_deref(),
        params.country.as_deref(),
    )?;

    // A panic anywhere in the pipeline surfaces as a JoinError and still yields demo data.
    let aggregator = Arc::clone(&state.aggregator);
    let task_query = query.clone();
    let response =
        match tokio::spawn(async move { aggregator.get_weather(&task_query).await }).await {
            Ok(response) => response,
            Err(e) => {
                error!(location = %query.to_query_string(), "Weather pipeline aborted: {}", e);
                fallback_response(&query)
            }
        };

    Ok(Json(response))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_first_value_wins() {
        let params = WeatherParams::from_pairs(pairs(&[
            ("city", "Paris"),
            ("country", "FR"),
            ("city", "Lyon"),
        ]));
        assert_eq!(params.city.as_deref(), Some("Paris"));
        assert_eq!(params.country.as_deref(), Some("FR"));
        assert!(params.state.is_none());
    }

    #[test]
    fn test_unknown_parameters_ignored() {
        let params = WeatherParams::from_pairs(pairs(&[("units", "metric"), ("q", "Oslo")]));
        assert_eq!(params, WeatherParams::default());
    }
}
