//! Client configuration.

use std::time::Duration;

/// Default API origin when `HIREFLOW_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";

/// Version prefix every resource path is mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// Configuration for [`crate::ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin, without the version prefix
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("HIREFLOW_API_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("HIREFLOW_API_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Origin with any trailing slash removed.
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Absolute URL of a resource path, e.g. `/jobs` -> `<origin>/api/v1/jobs`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}/{}", self.origin(), API_PREFIX, path.trim_start_matches('/'))
    }

    /// Absolute URL outside the versioned prefix (health probe).
    pub fn root_url(&self, path: &str) -> String {
        format!("{}/{}", self.origin(), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:5001");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_api_url_joins_prefix() {
        let config = ClientConfig::new("https://api.example.com/");
        assert_eq!(config.api_url("/jobs"), "https://api.example.com/api/v1/jobs");
        assert_eq!(config.api_url("jobs/1"), "https://api.example.com/api/v1/jobs/1");
        assert_eq!(config.root_url("/health"), "https://api.example.com/health");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("HIREFLOW_API_URL", "http://api.internal:8080");
        std::env::set_var("HIREFLOW_API_TIMEOUT_SECS", "3");
        let config = ClientConfig::from_env();
        assert_eq!(config.base_url, "http://api.internal:8080");
        assert_eq!(config.timeout, Duration::from_secs(3));

        std::env::remove_var("HIREFLOW_API_URL");
        std::env::remove_var("HIREFLOW_API_TIMEOUT_SECS");
        let config = ClientConfig::from_env();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
