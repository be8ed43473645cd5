//! Application settings configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the APTO API, without the `/api` segment.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Delay between a successful save/delete and the re-fetch.
    pub reconcile_delay_ms: u64,
    /// Delay between a successful registration and the move to login.
    pub register_redirect_ms: u64,
    /// How long success messages stay on screen.
    pub success_notification_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
            reconcile_delay_ms: 1500,
            register_redirect_ms: 2000,
            success_notification_ms: 3000,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn reconcile_delay(&self) -> Duration {
        Duration::from_millis(self.reconcile_delay_ms)
    }

    pub fn register_redirect(&self) -> Duration {
        Duration::from_millis(self.register_redirect_ms)
    }

    pub fn success_notification(&self) -> Duration {
        Duration::from_millis(self.success_notification_ms)
    }

    /// Validate these settings.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }

        if !self.api_url.starts_with("https://") && !self.api_url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "api_url '{}' must start with http:// or https://",
                self.api_url
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, "http://localhost:3000");
        assert_eq!(settings.reconcile_delay(), Duration::from_millis(1500));
        assert_eq!(settings.register_redirect(), Duration::from_secs(2));
        assert_eq!(settings.success_notification(), Duration::from_secs(3));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_url_scheme_rejected() {
        let settings = Settings {
            api_url: "localhost:3000".to_string(),
            ..Settings::default()
        };
        let result = settings.validate();
        assert!(result.unwrap_err().to_string().contains("must start with http"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let settings = Settings {
            request_timeout_secs: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str("api_url = \"https://apto.example.com\"").unwrap();
        assert_eq!(settings.api_url, "https://apto.example.com");
        assert_eq!(settings.request_timeout_secs, 30);
    }
}
