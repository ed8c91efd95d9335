//! CLI module
//!
//! Command-line interface to the API.
//!
//! # Commands
//!
//! - `get` - Print a single object
//! - `iterate` - Print every object of a collection
//! - `search` - Run an Intelligence search
//! - `patch` - Update attributes of an object
//! - `download` - Download a file
//! - `metadata` - Print service metadata

mod commands;
mod runner;

pub use commands::{Cli, Commands, IterArgs, OutputFormat};
pub use runner::Runner;
