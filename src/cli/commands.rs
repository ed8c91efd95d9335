//! CLI commands and argument parsing

use crate::config::{API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL};
use crate::iterator::IteratorOptions;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// VirusTotal API command-line client
#[derive(Parser, Debug)]
#[command(name = "vt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API key
    #[arg(short = 'k', long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub apikey: Option<String>,

    /// Base URL of the API
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a single object, e.g. `files/{hash}`
    Get {
        /// Object path or URL
        path: String,
    },

    /// Print every object of a collection
    Iterate {
        /// Collection path or URL, e.g. `comments`
        path: String,

        #[command(flatten)]
        iter: IterArgs,
    },

    /// Search with the Intelligence query language
    Search {
        /// Search query
        query: String,

        /// Return descriptors (id and type) only
        #[arg(long)]
        descriptors_only: bool,

        #[command(flatten)]
        iter: IterArgs,
    },

    /// Update attributes of an object
    Patch {
        /// Object path or URL
        path: String,

        /// Attributes as name=value; values are parsed as JSON, falling back
        /// to plain strings
        #[arg(required = true, value_parser = parse_assignment)]
        attributes: Vec<(String, String)>,
    },

    /// Download a file by SHA-256, SHA-1 or MD5
    Download {
        /// File hash
        hash: String,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print service metadata
    Metadata,
}

impl Commands {
    /// Subcommand name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Get { .. } => "get",
            Commands::Iterate { .. } => "iterate",
            Commands::Search { .. } => "search",
            Commands::Patch { .. } => "patch",
            Commands::Download { .. } => "download",
            Commands::Metadata => "metadata",
        }
    }
}

/// Iteration flags shared by `iterate` and `search`
#[derive(Args, Debug, Clone, Default)]
pub struct IterArgs {
    /// Maximum number of objects (0 = all)
    #[arg(long, default_value = "0")]
    pub limit: usize,

    /// Objects per page (0 = server default)
    #[arg(long, default_value = "0")]
    pub batch_size: usize,

    /// Filter expression
    #[arg(long)]
    pub filter: Option<String>,

    /// Resume from a cursor printed by a previous run
    #[arg(long)]
    pub cursor: Option<String>,
}

impl IterArgs {
    /// Convert into iterator options
    pub fn to_options(&self) -> IteratorOptions {
        let mut options = IteratorOptions::new()
            .limit(self.limit)
            .batch_size(self.batch_size);
        if let Some(filter) = &self.filter {
            options = options.filter(filter.clone());
        }
        if let Some(cursor) = &self.cursor {
            options = options.cursor(cursor.clone());
        }
        options
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one object per line)
    Json,
    /// Indented JSON
    Pretty,
}

fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got \"{s}\"")),
    }
}
