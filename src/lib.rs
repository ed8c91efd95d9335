// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # VirusTotal API client
//!
//! Client for the VirusTotal v3 REST API: every resource (files, URLs,
//! domains, comments, hunting rulesets, ...) is an object with an identifier,
//! a type and a bag of attributes, and collections are paginated.
//!
//! ## Features
//!
//! - **Objects**: typed and dotted-path attribute access, dirty tracking for
//!   partial updates, relationships
//! - **Transport Facade**: authentication, URL resolution, response envelope
//!   and API error decoding
//! - **Iterators**: background page fetching with bounded read-ahead,
//!   resumable cursors, cancellation
//! - **Rate Limiting**: optional client-side throttling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vt_client::{Client, IteratorOptions, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::new("<apikey>")?;
//!
//!     // Fetch a single object
//!     let file = client.get_object(&client.url("files/44d88612fea8a8f36de82e1278abb02f")?).await?;
//!     println!("{}", file.get_int("size")?);
//!
//!     // Walk a collection
//!     let mut it = client.iterator(client.url("comments")?, IteratorOptions::new().limit(10))?;
//!     while it.advance().await {
//!         println!("{}", it.current().map(|c| c.id()).unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Client                               │
//! │  url()   get/post/patch/delete   *_object()   iterator()     │
//! └──────────────────────────────────────────────────────────────┘
//!            │                                   │
//! ┌──────────┴──────────┬───────────────┬────────┴──────────────┐
//! │      Transport      │    Object     │   CollectionIterator  │
//! ├─────────────────────┼───────────────┼───────────────────────┤
//! │ reqwest (gzip)      │ Attributes    │ Producer task         │
//! │ Rate Limit          │ Dotted paths  │ Bounded channel       │
//! │                     │ Dirty set     │ Cursor codec          │
//! └─────────────────────┴───────────────┴───────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// API objects and their attributes
pub mod object;

/// Resumable iteration cursors
pub mod cursor;

/// HTTP transport and rate limiting
pub mod http;

/// Client configuration
pub mod config;

/// API client
pub mod client;

/// Collection iterators
pub mod iterator;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{Client, Metadata, Request, Response};
pub use config::ClientConfig;
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use iterator::{Canceller, CollectionIterator, IteratorOptions, SearchOptions};
pub use object::{Object, Relationship};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
