//! SDK Configuration

use std::time::Duration;

/// Default address of the real-time subscriptions endpoint
pub const DEFAULT_REALTIME_API: &str = "https://api.instagram.com/v1/subscriptions/";

/// Configuration for the real-time subscriptions SDK
#[derive(Debug, Clone)]
pub struct Config {
    /// Application client ID
    pub client_id: String,

    /// Application client secret
    pub client_secret: String,

    /// URL the API calls back with notifications
    pub callback_url: String,

    /// Base URL of the real-time subscriptions endpoint
    pub realtime_api: String,

    /// Request timeout (transport default when unset)
    pub timeout: Option<Duration>,

    /// User agent string
    pub user_agent: String,
}

impl Config {
    /// Create a new configuration for the given application
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            callback_url: callback_url.into(),
            realtime_api: DEFAULT_REALTIME_API.to_string(),
            timeout: None,
            user_agent: format!("ig-realtime-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Point the SDK at a different subscriptions endpoint
    pub fn with_realtime_api(mut self, realtime_api: impl Into<String>) -> Self {
        self.realtime_api = realtime_api.into();
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set custom user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = Config::new("id", "secret", "https://example.com/cb");

        assert_eq!(config.client_id, "id");
        assert_eq!(config.client_secret, "secret");
        assert_eq!(config.callback_url, "https://example.com/cb");
        assert_eq!(config.realtime_api, DEFAULT_REALTIME_API);
        assert!(config.timeout.is_none());
        assert!(config.user_agent.starts_with("ig-realtime-rust/"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::new("id", "secret", "cb")
            .with_realtime_api("http://localhost:9000/subs")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("tests");

        assert_eq!(config.realtime_api, "http://localhost:9000/subs");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent, "tests");
    }
}
