//! The reqwest client every transport sends through.
//!
//! Built once from the `[api]` section; the user agent and both timeouts
//! apply to the refresh call as much as to ordinary requests.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// Configured reqwest client plus the settings it was built with.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    user_agent: String,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl HttpClient {
    /// Client with the default `[api]` settings.
    pub fn new() -> Result<Self> {
        Self::from_config(&ApiConfig::default())
    }

    /// Client for the `[api]` configuration section. Fails with
    /// [`Error::Config`] when reqwest cannot build it.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let connect_timeout = config.connect_timeout();
        let request_timeout = config.request_timeout();
        let inner = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        debug!(
            user_agent = config.user_agent.as_str(),
            connect_timeout_secs = connect_timeout.as_secs(),
            request_timeout_secs = request_timeout.as_secs(),
            "HTTP client ready"
        );

        Ok(Self {
            inner,
            user_agent: config.user_agent.clone(),
            connect_timeout,
            request_timeout,
        })
    }

    pub fn inner(&self) -> &Client {
        &self.inner
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Whole-request deadline, including reading the body.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_api_config() {
        let http = HttpClient::new().unwrap();
        let defaults = ApiConfig::default();
        assert_eq!(http.user_agent(), defaults.user_agent);
        assert!(http.user_agent().starts_with("wishflick-client/"));
        assert_eq!(http.connect_timeout(), Duration::from_secs(10));
        assert_eq!(http.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_config_applies_settings() {
        let config = ApiConfig {
            user_agent: "wishflick-cli/test".into(),
            connect_timeout_secs: 2,
            request_timeout_secs: 5,
            ..ApiConfig::default()
        };
        let http = HttpClient::from_config(&config).unwrap();
        assert_eq!(http.user_agent(), "wishflick-cli/test");
        assert_eq!(http.connect_timeout(), Duration::from_secs(2));
        assert_eq!(http.request_timeout(), Duration::from_secs(5));
    }
}
