//! Client configuration
//!
//! All settings are explicit values handed to [`Client`](crate::Client) at
//! construction time. Pointing a client at another host (a mock server in
//! tests, a staging deployment) means building a second client with another
//! `base_url`.

use crate::http::RateLimiterConfig;
use crate::types::StringMap;
use std::time::Duration;

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.virustotal.com/api/v3/";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "VT_APIKEY";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "VT_BASE_URL";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key sent in the `x-apikey` header
    pub api_key: String,
    /// Base URL that relative paths are resolved against
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    ///
    /// The service only serves compressed bodies to user agents containing
    /// the `gzip` token.
    pub user_agent: String,
    /// Headers sent with every request; per-request headers take precedence
    pub global_headers: StringMap,
    /// Client-side rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("vt-client/{}; gzip", env!("CARGO_PKG_VERSION")),
            global_headers: StringMap::new(),
            rate_limit: None,
        }
    }
}

impl ClientConfig {
    /// Create a config with the given API key and defaults elsewhere
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Build a config from `VT_APIKEY` and `VT_BASE_URL`
    pub fn from_env() -> Self {
        let mut config = Self::new(std::env::var(API_KEY_ENV).unwrap_or_default());
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        config
    }
}

/// Builder for client config
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Add a header sent with every request
    pub fn global_header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.config
            .global_headers
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
