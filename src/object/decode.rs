//! Object decoding
//!
//! Turns raw JSON into [`Object`]s, reporting the location of the first
//! malformed field.

use super::types::{Object, Relationship};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, Links};
use std::collections::HashMap;

fn field(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

impl Object {
    /// Decode an object from its JSON form
    pub fn from_value(value: JsonValue) -> Result<Self> {
        Self::decode_at(value, "")
    }

    /// Decode an object located at `path` within a larger payload
    pub(crate) fn decode_at(value: JsonValue, path: &str) -> Result<Self> {
        let JsonValue::Object(mut map) = value else {
            return Err(Error::decode(path, "expected an object"));
        };

        let object_type = match map.remove("type") {
            Some(JsonValue::String(t)) if !t.is_empty() => t,
            Some(JsonValue::String(_)) | None | Some(JsonValue::Null) => {
                return Err(Error::decode(field(path, "type"), "missing object type"))
            }
            Some(_) => return Err(Error::decode(field(path, "type"), "expected a string")),
        };

        let id = match map.remove("id") {
            Some(JsonValue::String(id)) => id,
            None | Some(JsonValue::Null) => String::new(),
            Some(_) => return Err(Error::decode(field(path, "id"), "expected a string")),
        };

        let attributes = decode_map(map.remove("attributes"), &field(path, "attributes"))?;
        let context_attributes = decode_map(
            map.remove("context_attributes"),
            &field(path, "context_attributes"),
        )?;
        let links = decode_links(map.remove("links"), &field(path, "links"))?;

        let mut relationships = HashMap::new();
        let rel_path = field(path, "relationships");
        for (name, raw) in decode_map(map.remove("relationships"), &rel_path)? {
            let relationship = decode_relationship(raw, &field(&rel_path, &name))?;
            relationships.insert(name, relationship);
        }

        Ok(Self {
            id,
            object_type,
            attributes,
            context_attributes,
            relationships,
            links,
            modified_attributes: Vec::new(),
            data: JsonObject::new(),
        })
    }
}

fn decode_map(value: Option<JsonValue>, path: &str) -> Result<JsonObject> {
    match value {
        Some(JsonValue::Object(map)) => Ok(map),
        None | Some(JsonValue::Null) => Ok(JsonObject::new()),
        Some(_) => Err(Error::decode(path, "expected an object")),
    }
}

fn decode_links(value: Option<JsonValue>, path: &str) -> Result<Links> {
    match value {
        None | Some(JsonValue::Null) => Ok(Links::default()),
        Some(value) => {
            serde_json::from_value(value).map_err(|e| Error::decode(path, e.to_string()))
        }
    }
}

/// A relationship payload is a single object (one-to-one), `null`
/// (one-to-one with nothing related) or an array of objects.
fn decode_relationship(value: JsonValue, path: &str) -> Result<Relationship> {
    let JsonValue::Object(mut map) = value else {
        return Err(Error::decode(path, "expected an object"));
    };

    let links = decode_links(map.remove("links"), &field(path, "links"))?;
    let data_path = field(path, "data");

    let (is_one_to_one, related_objects) = match map.remove("data") {
        None | Some(JsonValue::Null) => (true, Vec::new()),
        Some(single @ JsonValue::Object(_)) => (true, vec![Object::decode_at(single, &data_path)?]),
        Some(JsonValue::Array(items)) => {
            let related = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| Object::decode_at(item, &format!("{data_path}[{i}]")))
                .collect::<Result<Vec<_>>>()?;
            (false, related)
        }
        Some(_) => {
            return Err(Error::decode(
                data_path,
                "expected an object, an array or null",
            ))
        }
    };

    Ok(Relationship {
        is_one_to_one,
        related_objects,
        links,
    })
}
