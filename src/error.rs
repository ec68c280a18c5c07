//! Error types for the Saviour weather service
//!
//! Only [`SaviourError::Validation`] ever reaches an HTTP caller. Everything
//! else is raised by upstream adapters or startup code and is either absorbed
//! by the fallback chain or aborts the process before it serves traffic.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaviourError {
    /// Invalid or inconsistent settings
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream request failed (network, timeout, non-2xx status)
    #[error("API error: {message}")]
    Api { message: String },

    /// Upstream body did not match the expected shape
    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Missing credentials for provider '{provider}'")]
    MissingCredentials { provider: String },

    /// Rejected request input
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl SaviourError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn missing_credentials<S: Into<String>>(provider: S) -> Self {
        Self::MissingCredentials {
            provider: provider.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the error is the caller's fault and should be reported back
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Message safe to show to an end user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            Self::Api { .. } | Self::Parse { .. } => {
                "Unable to reach the weather services right now.".to_string()
            }
            Self::MissingCredentials { provider } => {
                format!("Weather provider '{provider}' is not configured.")
            }
            Self::Validation { message } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(matches!(
            SaviourError::config("missing API key"),
            SaviourError::Config { .. }
        ));
        assert!(matches!(
            SaviourError::api("connection failed"),
            SaviourError::Api { .. }
        ));
        assert!(
            SaviourError::missing_credentials("weatherapi")
                .to_string()
                .contains("weatherapi")
        );
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = SaviourError::validation("City is required");
        assert_eq!(err.user_message(), "City is required");
        assert_eq!(err.to_string(), "Invalid input: City is required");
    }

    #[test]
    fn test_upstream_details_are_hidden() {
        let err = SaviourError::api("Upstream returned 401 - Unauthorized");
        assert_eq!(
            err.user_message(),
            "Unable to reach the weather services right now."
        );
        assert!(SaviourError::config("x").user_message().contains("Configuration error"));
    }

    #[test]
    fn test_only_validation_is_client_facing() {
        assert!(SaviourError::validation("City is required").is_client_error());
        assert!(!SaviourError::api("HTTP 503").is_client_error());
        assert!(!SaviourError::parse("missing field").is_client_error());
        assert!(!SaviourError::missing_credentials("openweathermap").is_client_error());
    }
}
