//! Error types for the VirusTotal client
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // API Errors
    // ============================================================================
    #[error("{code}: {message}")]
    Api { code: String, message: String },

    // ============================================================================
    // Decoding Errors
    // ============================================================================
    #[error("Failed to decode '{path}': {message}")]
    Decode { path: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid cursor: {message}")]
    InvalidCursor { message: String },

    // ============================================================================
    // Attribute Access Errors
    // ============================================================================
    #[error("{kind} \"{name}\" does not exist")]
    NotFound { kind: &'static str, name: String },

    #[error("attribute \"{name}\" is not {expected}")]
    WrongType { name: String, expected: &'static str },

    #[error("path segment \"{segment}\" requires {expected}")]
    TypeMismatch {
        segment: String,
        expected: &'static str,
    },

    #[error("Invalid attribute path: {path}")]
    InvalidPath { path: String },

    // ============================================================================
    // Configuration / I/O Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an API error
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a decode error located at `path`
    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid cursor error
    pub fn invalid_cursor(message: impl Into<String>) -> Self {
        Self::InvalidCursor {
            message: message.into(),
        }
    }

    /// Create a not-found error for an attribute
    pub fn attribute_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "attribute",
            name: name.into(),
        }
    }

    /// Create a not-found error for a context attribute
    pub fn context_attribute_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "context attribute",
            name: name.into(),
        }
    }

    /// Create a not-found error for a relationship
    pub fn relationship_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "relationship",
            name: name.into(),
        }
    }

    /// Create a wrong type error
    pub fn wrong_type(name: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongType {
            name: name.into(),
            expected,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Machine-matchable code of an API error
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Check if this is an attribute, context attribute or relationship lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if the underlying HTTP exchange failed
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Transport { .. } | Error::HttpStatus { .. }
        )
    }
}

/// Result type alias for the client
pub type Result<T> = std::result::Result<T, Error>;
