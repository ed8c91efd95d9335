//! API client
//!
//! Handles:
//! - URL resolution against the configured base URL
//! - Authentication and global headers
//! - Response envelope parsing and API error detection
//! - Object fetch, create, update and delete

use super::types::{Metadata, Page, Request, Response};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse, HttpTransport, RateLimiter, Transport};
use crate::iterator::{CollectionIterator, IteratorOptions, SearchOptions};
use crate::object::Object;
use crate::types::{Method, StringMap};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use url::Url;

/// Client for the VirusTotal API
///
/// Cloning is cheap; clones share the transport and the rate limiter.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    base_url: Url,
    transport: Arc<dyn Transport>,
    rate_limiter: Option<RateLimiter>,
}

impl Client {
    /// Create a client for the given API key with default configuration
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key))
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout, &config.user_agent)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client that sends requests through `transport`
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            config: Arc::new(config),
            base_url,
            transport,
            rate_limiter,
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve an API path such as `files/{hash}` into a full URL
    ///
    /// Absolute `http(s)://` URLs are returned unchanged.
    pub fn url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ========================================================================
    // Raw exchanges
    // ========================================================================

    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<Vec<u8>>,
        headers: StringMap,
    ) -> Result<HttpResponse> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = HttpRequest::new(method, url.clone())
            .header("user-agent", self.config.user_agent.clone());
        if !self.config.api_key.is_empty() {
            req = req.header("x-apikey", self.config.api_key.clone());
        }
        for (key, value) in &self.config.global_headers {
            req = req.header(key, value.clone());
        }
        for (key, value) in headers {
            req = req.header(key, value);
        }
        if let Some(body) = body {
            req = req.body(body);
        }

        debug!("{} {}", method, url);
        self.transport.send(req).await
    }

    async fn send_json(&self, method: Method, url: &Url, request: &Request) -> Result<Response> {
        let body = serde_json::to_vec(request)?;
        let mut headers = StringMap::new();
        headers.insert("content-type".into(), "application/json".into());

        let resp = self.send(method, url, Some(body), headers).await?;
        parse_response(method, url, resp)
    }

    /// Send a GET request
    pub async fn get(&self, url: &Url) -> Result<Response> {
        let resp = self.send(Method::GET, url, None, StringMap::new()).await?;
        parse_response(Method::GET, url, resp)
    }

    /// Send a POST request
    pub async fn post(&self, url: &Url, request: &Request) -> Result<Response> {
        self.send_json(Method::POST, url, request).await
    }

    /// Send a PATCH request
    pub async fn patch(&self, url: &Url, request: &Request) -> Result<Response> {
        self.send_json(Method::PATCH, url, request).await
    }

    /// Send a DELETE request
    pub async fn delete(&self, url: &Url) -> Result<Response> {
        let resp = self
            .send(Method::DELETE, url, None, StringMap::new())
            .await?;
        parse_response(Method::DELETE, url, resp)
    }

    // ========================================================================
    // Typed helpers
    // ========================================================================

    /// Send a GET request and deserialize the `data` payload into `T`
    pub async fn get_data<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let resp = self.get(url).await?;
        serde_json::from_value(resp.data).map_err(|e| Error::decode("data", e.to_string()))
    }

    /// Fetch a single object, e.g. `files/{hash}`
    ///
    /// The URL must address an object, not a collection.
    pub async fn get_object(&self, url: &Url) -> Result<Object> {
        let resp = self.get(url).await?;
        Object::decode_at(resp.data, "data")
    }

    /// Create `obj` in the collection at `url`
    ///
    /// On success `obj` is replaced by the object returned by the server,
    /// which carries its new identifier.
    pub async fn post_object(&self, url: &Url, obj: &mut Object) -> Result<()> {
        let resp = self.post(url, &Request::create(obj)).await?;
        *obj = Object::decode_at(resp.data, "data")?;
        Ok(())
    }

    /// Send the attributes modified on `obj` to the object at `url`
    ///
    /// On success `obj` is replaced by the object returned by the server and
    /// no attribute is considered modified anymore.
    pub async fn patch_object(&self, url: &Url, obj: &mut Object) -> Result<()> {
        let resp = self.patch(url, &Request::update(obj)).await?;
        *obj = Object::decode_at(resp.data, "data")?;
        Ok(())
    }

    /// Delete the object at `url`
    pub async fn delete_object(&self, url: &Url) -> Result<()> {
        self.delete(url).await.map(|_| ())
    }

    /// Fetch one page of a collection
    pub async fn fetch_page(&self, url: &Url) -> Result<Page> {
        let resp = self.get(url).await?;
        let page = Page::from_response(resp)?;
        debug!(
            "Fetched {} objects from {} (next: {})",
            page.objects.len(),
            url,
            if page.links.next.is_empty() {
                "none"
            } else {
                page.links.next.as_str()
            }
        );
        Ok(page)
    }

    /// Download a file given its SHA-256, SHA-1 or MD5, writing the content
    /// into `writer` and returning the number of bytes written
    ///
    /// The transport reads whole bodies, so the complete file is held in
    /// memory before being written out.
    pub async fn download_file<W>(&self, hash: &str, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let url = self.url(&format!("files/{hash}/download"))?;
        let resp = self
            .send(Method::GET, &url, None, StringMap::new())
            .await?;

        if !resp.is_success() {
            return Err(parse_response(Method::GET, &url, resp)
                .err()
                .unwrap_or_else(|| Error::http_status(0, "download failed")));
        }

        writer.write_all(&resp.body).await?;
        writer.flush().await?;
        Ok(resp.body.len() as u64)
    }

    /// Retrieve service metadata
    pub async fn get_metadata(&self) -> Result<Metadata> {
        self.get_data(&self.url("metadata")?).await
    }

    /// Create a collection named `name` from free text
    ///
    /// The server extracts hashes, URLs, domains and IP addresses from
    /// `text` and returns the new collection.
    pub async fn create_collection_from_raw_text(
        &self,
        name: &str,
        text: &str,
    ) -> Result<Object> {
        let mut collection = Object::new("collection");
        collection.set_data("raw_items", text);
        collection.set_string("name", name);

        self.post_object(&self.url("collections")?, &mut collection)
            .await?;
        Ok(collection)
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Iterate over the collection at `url`
    ///
    /// Must be called from within a Tokio runtime. Returns immediately; pages
    /// are fetched by a background task.
    pub fn iterator(&self, url: Url, options: IteratorOptions) -> Result<CollectionIterator> {
        CollectionIterator::start(self.clone(), url, options)
    }

    /// Search files with the Intelligence query language
    pub fn search(&self, query: &str, options: SearchOptions) -> Result<CollectionIterator> {
        let mut url = self.url("intelligence/search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            if options.descriptors_only {
                pairs.append_pair("descriptors_only", "true");
            }
        }
        self.iterator(url, options.iterator)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("has_api_key", &!self.config.api_key.is_empty())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Decode an HTTP response into the API envelope
///
/// An empty body is an empty envelope. Anything else must be JSON; an
/// envelope carrying an error code is an API error even with a 2xx status.
fn parse_response(method: Method, url: &Url, resp: HttpResponse) -> Result<Response> {
    if resp.body.is_empty() {
        if resp.is_success() {
            return Ok(Response::default());
        }
        return Err(Error::http_status(resp.status, ""));
    }

    let is_json = resp
        .header("content-type")
        .is_some_and(|ct| ct.starts_with("application/json"));
    if !is_json {
        if !resp.is_success() {
            return Err(Error::http_status(
                resp.status,
                String::from_utf8_lossy(&resp.body),
            ));
        }
        return Err(Error::transport(format!(
            "expecting JSON response from {method} {url}"
        )));
    }

    let envelope: Response = serde_json::from_slice(&resp.body).map_err(|e| {
        Error::transport(format!("malformed response from {method} {url}: {e}"))
    })?;

    let envelope = envelope.into_result().inspect_err(|e| {
        warn!("{} {} failed: {}", method, url, e);
    })?;

    if !resp.is_success() {
        return Err(Error::http_status(
            resp.status,
            String::from_utf8_lossy(&resp.body),
        ));
    }

    Ok(envelope)
}
