//! Client-side request throttling
//!
//! Uses the governor crate for token bucket rate limiting. API quotas are
//! expressed per minute, so is the configuration here.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Maximum number of requests per minute
    pub requests_per_minute: u32,
    /// Burst size (max tokens in bucket)
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::public_api()
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests_per_minute: u32, burst_size: u32) -> Self {
        Self {
            requests_per_minute,
            burst_size,
        }
    }

    /// Quota of the free public API (4 requests per minute)
    pub fn public_api() -> Self {
        Self {
            requests_per_minute: 4,
            burst_size: 4,
        }
    }

    /// Quota of a premium key, `requests_per_minute` with a matching burst
    pub fn premium(requests_per_minute: u32) -> Self {
        Self {
            requests_per_minute,
            burst_size: requests_per_minute,
        }
    }
}

/// Token bucket rate limiter
///
/// Clones share the same bucket.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        let quota = Quota::per_minute(
            NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rate_limiter_config_default() {
        let config = RateLimiterConfig::default();
        assert_eq!(config, RateLimiterConfig::public_api());
        assert_eq!(config.requests_per_minute, 4);
    }

    #[test]
    fn test_rate_limiter_config_premium() {
        let config = RateLimiterConfig::premium(1000);
        assert_eq!(config.requests_per_minute, 1000);
        assert_eq!(config.burst_size, 1000);
    }

    #[tokio::test]
    async fn test_rate_limiter_allows_burst_then_blocks() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(60, 3));

        tokio::time::timeout(Duration::from_millis(100), async {
            for _ in 0..3 {
                limiter.wait().await;
            }
        })
        .await
        .unwrap();

        // Bucket is empty, next token arrives in a second
        assert!(tokio::time::timeout(Duration::from_millis(50), limiter.wait())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_rate_limiter_clones_share_bucket() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(1, 1));
        let clone = limiter.clone();

        tokio::time::timeout(Duration::from_millis(100), limiter.wait())
            .await
            .unwrap();
        assert!(tokio::time::timeout(Duration::from_millis(50), clone.wait())
            .await
            .is_err());
    }
}
