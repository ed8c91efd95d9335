//! VirusTotal CLI
//!
//! Command-line interface to the VirusTotal API

use anyhow::Context;
use clap::Parser;
use vt_client::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries the objects
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = cli.command.name();
    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await.with_context(|| format!("vt {command} failed")) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
