//! Panicking accessors
//!
//! Each `must_get_*` method behaves like its `get_*` counterpart but panics
//! when the attribute is missing or has another type. Use them only where
//! the object shape was already validated.

use super::types::Object;
use chrono::{DateTime, Utc};

impl Object {
    /// Like [`Object::get_string`], panicking on error
    pub fn must_get_string(&self, name: &str) -> &str {
        match self.get_string(name) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`Object::get_int`], panicking on error
    pub fn must_get_int(&self, name: &str) -> i64 {
        match self.get_int(name) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`Object::get_float`], panicking on error
    pub fn must_get_float(&self, name: &str) -> f64 {
        match self.get_float(name) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`Object::get_bool`], panicking on error
    pub fn must_get_bool(&self, name: &str) -> bool {
        match self.get_bool(name) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`Object::get_time`], panicking on error
    pub fn must_get_time(&self, name: &str) -> DateTime<Utc> {
        match self.get_time(name) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`Object::get_string_slice`], panicking on error
    pub fn must_get_string_slice(&self, name: &str) -> Vec<&str> {
        match self.get_string_slice(name) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}
