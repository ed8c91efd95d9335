//! API client module
//!
//! Turns API paths into URLs, performs requests through a
//! [`Transport`](crate::http::Transport) and decodes the response envelope.
//!
//! # Overview
//!
//! - `Client` - entry point: raw verbs, object helpers, iterators
//! - `Request` / `Response` - the `{data, links, error}` envelopes
//! - `Page` - one decoded page of a collection
//! - `Metadata` - engines, relationships and privileges

mod api;
mod types;

pub use api::Client;
pub use types::{ApiError, Metadata, Page, RelationshipMeta, Request, Response};
