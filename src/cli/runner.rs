//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, IterArgs, OutputFormat};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::iterator::{CollectionIterator, SearchOptions};
use crate::types::JsonValue;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = self.client()?;

        match &self.cli.command {
            Commands::Get { path } => self.get(&client, path).await,
            Commands::Iterate { path, iter } => {
                let it = client.iterator(client.url(path)?, iter.to_options())?;
                self.drain(it).await
            }
            Commands::Search {
                query,
                descriptors_only,
                iter,
            } => self.search(&client, query, *descriptors_only, iter).await,
            Commands::Patch { path, attributes } => self.patch(&client, path, attributes).await,
            Commands::Download { hash, output } => Self::download(&client, hash, output).await,
            Commands::Metadata => {
                let metadata = client.get_metadata().await?;
                self.output(&metadata);
                Ok(())
            }
        }
    }

    /// Build the API client from the global flags
    fn client(&self) -> Result<Client> {
        let api_key = self.cli.apikey.clone().unwrap_or_default();
        if api_key.is_empty() {
            return Err(Error::config(
                "API key not specified (use --apikey or VT_APIKEY)",
            ));
        }

        let config = ClientConfig::builder()
            .api_key(api_key)
            .base_url(self.cli.base_url.clone())
            .build();
        Client::with_config(config)
    }

    async fn get(&self, client: &Client, path: &str) -> Result<()> {
        let obj = client.get_object(&client.url(path)?).await?;
        self.output(&obj);
        Ok(())
    }

    async fn search(
        &self,
        client: &Client,
        query: &str,
        descriptors_only: bool,
        iter: &IterArgs,
    ) -> Result<()> {
        let options = SearchOptions::new()
            .descriptors_only(descriptors_only)
            .iterator(iter.to_options());
        let it = client.search(query, options)?;
        self.drain(it).await
    }

    /// Print objects until the iterator ends or Ctrl+C is pressed, then
    /// print the continuation cursor to stderr
    async fn drain(&self, mut it: CollectionIterator) -> Result<()> {
        let canceller = it.canceller();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                canceller.cancel();
            }
        });

        while it.advance().await {
            if let Some(obj) = it.current() {
                self.output(obj);
            }
        }
        interrupt.abort();

        info!("{} objects", it.count());
        if !it.cursor().is_empty() {
            eprintln!("cursor: {}", it.cursor());
        }

        match it.take_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn patch(
        &self,
        client: &Client,
        path: &str,
        attributes: &[(String, String)],
    ) -> Result<()> {
        let url = client.url(path)?;
        let mut obj = client.get_object(&url).await?;

        for (name, raw) in attributes {
            let value = serde_json::from_str::<JsonValue>(raw)
                .unwrap_or_else(|_| JsonValue::String(raw.clone()));
            debug!("Setting {} = {}", name, value);
            obj.set(name.clone(), value);
        }

        client.patch_object(&url, &mut obj).await?;
        self.output(&obj);
        Ok(())
    }

    async fn download(client: &Client, hash: &str, output: &Path) -> Result<()> {
        let mut file = tokio::fs::File::create(output).await?;
        let written = client.download_file(hash, &mut file).await?;
        info!("Wrote {} bytes to {}", written, output.display());
        Ok(())
    }

    /// Output a value in the selected format
    fn output<T: Serialize + ?Sized>(&self, value: &T) {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value),
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
        };
        println!("{}", rendered.unwrap_or_default());
    }
}
