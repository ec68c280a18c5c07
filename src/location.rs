//! Location query model and input sanitization
//!
//! The weather endpoint accepts free-form place names from the UI. Everything
//! that reaches an upstream provider goes through [`sanitize`] first.

use serde::{Deserialize, Serialize};

use crate::{Result, SaviourError};

/// Maximum number of characters kept per location field
pub const MAX_FIELD_LEN: usize = 100;

/// Validated, sanitized location request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationQuery {
    city: String,
    state: Option<String>,
    country: Option<String>,
}

impl LocationQuery {
    /// Build a query from raw user input.
    ///
    /// Fails with `"City is required"` when nothing usable is left of `city`
    /// after sanitization. Empty optional fields are dropped.
    pub fn new(city: &str, state: Option<&str>, country: Option<&str>) -> Result<Self> {
        let city = sanitize(city);
        if city.is_empty() {
            return Err(SaviourError::validation("City is required"));
        }

        Ok(Self {
            city,
            state: state.map(sanitize).filter(|s| !s.is_empty()),
            country: country.map(sanitize).filter(|s| !s.is_empty()),
        })
    }

    /// Convenience constructor for a city-only query
    pub fn city_only(city: &str) -> Result<Self> {
        Self::new(city, None, None)
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    #[must_use]
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// The `q` value sent upstream: non-empty parts joined with `", "`
    #[must_use]
    pub fn to_query_string(&self) -> String {
        std::iter::once(self.city.as_str())
            .chain(self.state.as_deref())
            .chain(self.country.as_deref())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Generate cache key for this location and an upstream endpoint
    #[must_use]
    pub fn cache_key(&self, endpoint: &str) -> String {
        format!("weather:{endpoint}:{}", self.to_query_string().to_lowercase())
    }
}

/// Strip everything except letters, digits, whitespace, `,` `.` `-`, then
/// trim and truncate to [`MAX_FIELD_LEN`] characters.
#[must_use]
pub fn sanitize(input: &str) -> String {
    let kept: String = input
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, ',' | '.' | '-'))
        .collect();

    kept.trim().chars().take(MAX_FIELD_LEN).collect::<String>().trim_end().to_string()
}
