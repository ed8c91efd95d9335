//! Request and response envelopes
//!
//! Every API response is wrapped in `{data, links, error}`; request bodies
//! are wrapped in `{data}`.

use crate::error::{Error, Result};
use crate::object::Object;
use crate::types::{JsonValue, Links};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top level structure of a request body
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Request payload
    pub data: JsonValue,
}

impl Request {
    /// Wrap a payload
    pub fn new(data: impl Into<JsonValue>) -> Self {
        Self { data: data.into() }
    }

    /// Body for creating `obj`
    pub fn create(obj: &Object) -> Self {
        Self::new(obj.to_value())
    }

    /// Body for updating the modified attributes of `obj`
    pub fn update(obj: &Object) -> Self {
        Self::new(obj.to_modified_value())
    }
}

/// Error reported by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-matchable error code (e.g. "NotFoundError")
    #[serde(default)]
    pub code: String,
    /// Human-readable description
    #[serde(default)]
    pub message: String,
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api {
            code: err.code,
            message: err.message,
        }
    }
}

/// Top level structure of a response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    /// Response payload
    #[serde(default)]
    pub data: JsonValue,
    /// Pagination links
    #[serde(default)]
    pub links: Links,
    /// Error, if the request failed
    #[serde(default)]
    pub error: Option<ApiError>,
}

impl Response {
    /// Take the error out of the envelope if it carries one
    pub(crate) fn into_result(self) -> Result<Self> {
        match &self.error {
            Some(err) if !err.code.is_empty() => Err(err.clone().into()),
            _ => Ok(self),
        }
    }
}

/// One page of a collection
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Objects in server order
    pub objects: Vec<Object>,
    /// Links of the page; `next` is empty on the last page
    pub links: Links,
}

impl Page {
    /// Decode the payload of a collection response
    ///
    /// Collection endpoints return an array, a single object is accepted as a
    /// one-item page and `null` as an empty page.
    pub fn from_response(response: Response) -> Result<Self> {
        let objects = match response.data {
            JsonValue::Null => Vec::new(),
            JsonValue::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| Object::decode_at(item, &format!("data[{i}]")))
                .collect::<Result<Vec<_>>>()?,
            single @ JsonValue::Object(_) => vec![Object::decode_at(single, "data")?],
            _ => {
                return Err(Error::decode(
                    "data",
                    "expected an object, an array or null",
                ))
            }
        };

        Ok(Self {
            objects,
            links: response.links,
        })
    }
}

/// Relationship description from the metadata endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipMeta {
    /// Relationship name
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
}

/// Service metadata: engines, relationships per object type and the
/// privileges of the current API key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Antivirus engines and their details
    #[serde(default)]
    pub engines: HashMap<String, JsonValue>,
    /// Relationships supported by each object type
    #[serde(default)]
    pub relationships: HashMap<String, Vec<RelationshipMeta>>,
    /// Privileges of the API key
    #[serde(default)]
    pub privileges: Vec<String>,
}
