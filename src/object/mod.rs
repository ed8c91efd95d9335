//! API objects
//!
//! Every resource exposed by the API (files, URLs, comments, collections...)
//! is an object with an identifier, a type and a bag of dynamically typed
//! attributes. This module provides:
//!
//! - `Object` - the attribute bag with typed accessors, dotted path lookup
//!   and dirty tracking for partial updates
//! - `Relationship` - related objects requested alongside an object
//!
//! Values are kept as [`JsonValue`](crate::types::JsonValue), so numbers are
//! only coerced when an accessor asks for a specific type.
//!
//! The `must_get_*` accessors panic instead of returning errors. They are
//! meant for call sites that already validated the object shape.

mod decode;
mod must;
mod path;
mod types;

pub use types::{Object, Relationship};
