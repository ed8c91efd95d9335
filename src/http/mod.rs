//! HTTP transport module
//!
//! The API client never talks to the network directly. Every exchange goes
//! through a [`Transport`], which takes a fully built request and returns
//! status, headers and the (already decompressed) body.
//!
//! # Features
//!
//! - **Pluggable transport**: `HttpTransport` uses reqwest, tests can plug
//!   in an in-memory implementation
//! - **Compression**: gzip bodies are negotiated and decoded transparently
//! - **Rate Limiting**: optional token bucket rate limiter using governor

mod rate_limit;
mod transport;

pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
