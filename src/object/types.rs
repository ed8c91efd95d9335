//! Object and relationship types
//!
//! Defines the attribute bag, its typed accessors and setters.

use super::path;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, Links};
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;
use std::collections::{HashMap, HashSet};

/// Objects related to another object through a named relationship
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationship {
    /// Whether the relationship holds at most one object
    pub is_one_to_one: bool,
    /// Related objects, usually descriptors with only `id` and `type`
    pub related_objects: Vec<Object>,
    /// Links for paginating the relationship
    pub links: Links,
}

impl Relationship {
    /// The related object of a one-to-one relationship, if any
    pub fn single(&self) -> Option<&Object> {
        if self.is_one_to_one {
            self.related_objects.first()
        } else {
            None
        }
    }

    pub(crate) fn to_value(&self) -> JsonValue {
        let data = if self.is_one_to_one {
            self.related_objects
                .first()
                .map_or(JsonValue::Null, Object::to_value)
        } else {
            JsonValue::Array(self.related_objects.iter().map(Object::to_value).collect())
        };

        let mut value = json!({ "data": data });
        if !self.links.is_empty() {
            value["links"] = serde_json::to_value(&self.links).unwrap_or_default();
        }
        value
    }
}

/// An API object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    pub(crate) id: String,
    pub(crate) object_type: String,
    pub(crate) attributes: JsonObject,
    pub(crate) context_attributes: JsonObject,
    pub(crate) relationships: HashMap<String, Relationship>,
    pub(crate) links: Links,
    pub(crate) modified_attributes: Vec<String>,
    /// Top-level fields sent next to `attributes`, e.g. `raw_items`
    pub(crate) data: JsonObject,
}

impl Object {
    /// Create a new local object of the given type
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            ..Default::default()
        }
    }

    /// Create a local object that refers to an existing identifier
    pub fn with_id(object_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object_type: object_type.into(),
            ..Default::default()
        }
    }

    /// Object identifier, empty for objects not yet created
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Object type (e.g. "file", "url", "collection")
    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// Links returned with the object
    pub fn links(&self) -> &Links {
        &self.links
    }

    /// Names of the attributes set locally, in the order they were set
    pub fn modified_attributes(&self) -> &[String] {
        &self.modified_attributes
    }

    // ========================================================================
    // Name listings
    // ========================================================================

    /// Names of all attributes
    pub fn attributes(&self) -> Vec<&str> {
        self.attributes.keys().map(String::as_str).collect()
    }

    /// Names of all context attributes
    pub fn context_attributes(&self) -> Vec<&str> {
        self.context_attributes.keys().map(String::as_str).collect()
    }

    /// Names of the relationships included in the response
    pub fn relationships(&self) -> Vec<&str> {
        self.relationships.keys().map(String::as_str).collect()
    }

    /// Get a relationship by name
    ///
    /// The API only returns relationships that were explicitly requested,
    /// so a miss may also mean the relationship was not asked for.
    pub fn get_relationship(&self, name: &str) -> Result<&Relationship> {
        self.relationships
            .get(name)
            .ok_or_else(|| Error::relationship_not_found(name))
    }

    // ========================================================================
    // Attribute getters
    // ========================================================================

    /// Resolve a dotted path such as `last_analysis_results.Avast.category`
    /// or `tags.[0]` against the attributes
    pub fn get(&self, path: &str) -> Result<&JsonValue> {
        path::resolve(&self.attributes, path)
    }

    /// Get a string attribute
    pub fn get_string(&self, name: &str) -> Result<&str> {
        coerce_str(name, attribute(&self.attributes, name)?)
    }

    /// Get an integer attribute
    pub fn get_int(&self, name: &str) -> Result<i64> {
        coerce_int(name, attribute(&self.attributes, name)?)
    }

    /// Get a numeric attribute as a float
    pub fn get_float(&self, name: &str) -> Result<f64> {
        coerce_float(name, attribute(&self.attributes, name)?)
    }

    /// Get a boolean attribute
    pub fn get_bool(&self, name: &str) -> Result<bool> {
        coerce_bool(name, attribute(&self.attributes, name)?)
    }

    /// Get a timestamp attribute stored as seconds since the Unix epoch
    pub fn get_time(&self, name: &str) -> Result<DateTime<Utc>> {
        coerce_time(name, attribute(&self.attributes, name)?)
    }

    /// Get an attribute holding a list of strings
    pub fn get_string_slice(&self, name: &str) -> Result<Vec<&str>> {
        coerce_str_slice(name, attribute(&self.attributes, name)?)
    }

    // ========================================================================
    // Context attribute getters
    // ========================================================================

    /// Get a context attribute without coercion
    pub fn get_context(&self, name: &str) -> Result<&JsonValue> {
        context_attribute(&self.context_attributes, name)
    }

    /// Get a string context attribute
    pub fn get_context_string(&self, name: &str) -> Result<&str> {
        coerce_str(name, context_attribute(&self.context_attributes, name)?)
    }

    /// Get an integer context attribute
    pub fn get_context_int(&self, name: &str) -> Result<i64> {
        coerce_int(name, context_attribute(&self.context_attributes, name)?)
    }

    /// Get a numeric context attribute as a float
    pub fn get_context_float(&self, name: &str) -> Result<f64> {
        coerce_float(name, context_attribute(&self.context_attributes, name)?)
    }

    /// Get a boolean context attribute
    pub fn get_context_bool(&self, name: &str) -> Result<bool> {
        coerce_bool(name, context_attribute(&self.context_attributes, name)?)
    }

    /// Get a timestamp context attribute
    pub fn get_context_time(&self, name: &str) -> Result<DateTime<Utc>> {
        coerce_time(name, context_attribute(&self.context_attributes, name)?)
    }

    /// Get a context attribute holding a list of strings
    pub fn get_context_string_slice(&self, name: &str) -> Result<Vec<&str>> {
        coerce_str_slice(name, context_attribute(&self.context_attributes, name)?)
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Set an attribute, marking it as modified
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        let name = name.into();
        self.attributes.insert(name.clone(), value.into());
        self.modified_attributes.push(name);
    }

    /// Set a string attribute
    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name, JsonValue::String(value.into()));
    }

    /// Set an integer attribute
    pub fn set_int(&mut self, name: impl Into<String>, value: i64) {
        self.set(name, value);
    }

    /// Set a float attribute
    ///
    /// Non-finite values have no JSON representation and are stored as null.
    pub fn set_float(&mut self, name: impl Into<String>, value: f64) {
        self.set(name, value);
    }

    /// Set a boolean attribute
    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.set(name, value);
    }

    /// Set a timestamp attribute, stored as seconds since the Unix epoch
    pub fn set_time(&mut self, name: impl Into<String>, value: DateTime<Utc>) {
        self.set(name, value.timestamp());
    }

    /// Set a top-level field outside of `attributes`
    ///
    /// Some endpoints take extra input next to the attributes, such as the
    /// `raw_items` of a new collection. These fields are sent with both the
    /// full and the modified form; `id` and `type` cannot be overridden.
    pub fn set_data(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.data.insert(name.into(), value.into());
    }

    /// Get a top-level field set with [`Object::set_data`]
    pub fn get_data(&self, name: &str) -> Option<&JsonValue> {
        self.data.get(name)
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    /// Full JSON form of the object
    pub fn to_value(&self) -> JsonValue {
        let mut value = self.data.clone();
        value.remove("id");
        if !self.id.is_empty() {
            value.insert("id".into(), JsonValue::String(self.id.clone()));
        }
        value.insert("type".into(), JsonValue::String(self.object_type.clone()));
        if !self.attributes.is_empty() {
            value.insert(
                "attributes".into(),
                JsonValue::Object(self.attributes.clone()),
            );
        }
        if !self.context_attributes.is_empty() {
            value.insert(
                "context_attributes".into(),
                JsonValue::Object(self.context_attributes.clone()),
            );
        }
        if !self.relationships.is_empty() {
            let relationships = self
                .relationships
                .iter()
                .map(|(name, rel)| (name.clone(), rel.to_value()))
                .collect();
            value.insert("relationships".into(), JsonValue::Object(relationships));
        }
        if !self.links.is_empty() {
            value.insert(
                "links".into(),
                serde_json::to_value(&self.links).unwrap_or_default(),
            );
        }
        JsonValue::Object(value)
    }

    /// JSON form containing only the identity and the modified attributes
    ///
    /// Each modified attribute appears once, with its current value. Context
    /// attributes, relationships and links are left out. This is the payload
    /// expected by update requests.
    pub fn to_modified_value(&self) -> JsonValue {
        let mut seen = HashSet::new();
        let mut attributes = JsonObject::new();
        for name in &self.modified_attributes {
            if !seen.insert(name.as_str()) {
                continue;
            }
            if let Some(value) = self.attributes.get(name) {
                attributes.insert(name.clone(), value.clone());
            }
        }

        let mut value = self.data.clone();
        value.remove("id");
        if !self.id.is_empty() {
            value.insert("id".into(), JsonValue::String(self.id.clone()));
        }
        value.insert("type".into(), JsonValue::String(self.object_type.clone()));
        value.insert("attributes".into(), JsonValue::Object(attributes));
        JsonValue::Object(value)
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Object {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Object::from_value(value).map_err(D::Error::custom)
    }
}

// ============================================================================
// Lookup and coercion helpers
// ============================================================================

fn attribute<'a>(map: &'a JsonObject, name: &str) -> Result<&'a JsonValue> {
    map.get(name)
        .ok_or_else(|| Error::attribute_not_found(name))
}

fn context_attribute<'a>(map: &'a JsonObject, name: &str) -> Result<&'a JsonValue> {
    map.get(name)
        .ok_or_else(|| Error::context_attribute_not_found(name))
}

fn coerce_str<'a>(name: &str, value: &'a JsonValue) -> Result<&'a str> {
    match value {
        JsonValue::String(s) => Ok(s),
        _ => Err(Error::wrong_type(name, "a string")),
    }
}

fn coerce_int(name: &str, value: &JsonValue) -> Result<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().ok_or_else(|| Error::wrong_type(name, "an integer")),
        _ => Err(Error::wrong_type(name, "an integer")),
    }
}

fn coerce_float(name: &str, value: &JsonValue) -> Result<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64().ok_or_else(|| Error::wrong_type(name, "a number")),
        _ => Err(Error::wrong_type(name, "a number")),
    }
}

fn coerce_bool(name: &str, value: &JsonValue) -> Result<bool> {
    match value {
        JsonValue::Bool(b) => Ok(*b),
        _ => Err(Error::wrong_type(name, "a boolean")),
    }
}

fn coerce_time(name: &str, value: &JsonValue) -> Result<DateTime<Utc>> {
    let secs = coerce_int(name, value).map_err(|_| Error::wrong_type(name, "a timestamp"))?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| Error::wrong_type(name, "a timestamp"))
}

fn coerce_str_slice<'a>(name: &str, value: &'a JsonValue) -> Result<Vec<&'a str>> {
    match value {
        JsonValue::Array(items) => items
            .iter()
            .map(|item| item.as_str().ok_or_else(|| Error::wrong_type(name, "a list of strings")))
            .collect(),
        _ => Err(Error::wrong_type(name, "a list of strings")),
    }
}
