//! Resumable iteration cursors
//!
//! A cursor pins an iteration position as the link of the page to fetch
//! plus the number of items of that page already handed out. Encoded
//! cursors are the opaque tokens exposed by
//! [`CollectionIterator::cursor`](crate::iterator::CollectionIterator::cursor):
//! the JSON form is deflated at maximum compression and written with the
//! URL-safe base64 alphabet, without padding.

use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Position inside a paginated collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Absolute URL of the page to fetch next; empty means start of collection
    #[serde(rename = "Link")]
    pub link: String,

    /// Items of the page at `link` that were already yielded
    #[serde(rename = "Offset")]
    pub offset: usize,
}

impl Cursor {
    /// Create a cursor
    pub fn new(link: impl Into<String>, offset: usize) -> Self {
        Self {
            link: link.into(),
            offset,
        }
    }

    /// Whether the cursor carries no position
    pub fn is_empty(&self) -> bool {
        self.link.is_empty()
    }

    /// Encode into an opaque URL-safe token
    ///
    /// A cursor without a link encodes to the empty string.
    pub fn encode(&self) -> String {
        if self.link.is_empty() {
            return String::new();
        }

        // Writing into a Vec cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
        let compressed = encoder
            .write_all(&json)
            .and_then(|()| encoder.finish())
            .unwrap_or_default();

        URL_SAFE_NO_PAD.encode(compressed)
    }

    /// Decode a token produced by [`Cursor::encode`]
    ///
    /// The empty string decodes to the empty cursor.
    pub fn decode(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Ok(Self::default());
        }

        let compressed = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| Error::invalid_cursor(format!("not base64: {e}")))?;

        let mut json = Vec::new();
        DeflateDecoder::new(compressed.as_slice())
            .read_to_end(&mut json)
            .map_err(|e| Error::invalid_cursor(format!("not deflate data: {e}")))?;

        serde_json::from_slice(&json)
            .map_err(|e| Error::invalid_cursor(format!("malformed payload: {e}")))
    }
}
