//! HTTP probe for functional endpoints.
//!
//! ### Contract
//! - One call is one GET; no retries.
//! - Only connection-level failures (DNS, refused, transport timeout) are
//!   errors. Any HTTP status, including 5xx, is reported in the snapshot.
//! - Bodies are parsed as JSON, falling back to text.
//! - Latency covers the request and body read only, not parsing.

pub mod url;

use bytes::Bytes;
use reqwest::{Client, StatusCode, header};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub use self::url::{UrlError, resolve_endpoint};

use cachecheck_core::{AppConfig, Body, Error, Probe, Snapshot};

use crate::ClientError;

/// Configuration shared by the probe and the invalidation client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL that endpoint paths are resolved against.
    pub base_url: ::url::Url,

    /// User agent string (default: "cachecheck/0.1")
    pub user_agent: String,

    /// Accept header (default: "application/json")
    pub accept: String,

    /// Transport timeout (default: 30s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: ::url::Url::parse("https://devtez.91trucks.com").expect("static base URL is valid"),
            user_agent: "cachecheck/0.1".to_string(),
            accept: "application/json".to_string(),
            timeout: Duration::from_millis(30_000),
            max_redirects: 5,
        }
    }
}

impl ClientConfig {
    /// Derive client settings from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ClientError> {
        let base_url = ::url::Url::parse(&config.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            base_url,
            user_agent: config.user_agent.clone(),
            accept: config.accept.clone(),
            timeout: config.timeout(),
            ..Default::default()
        })
    }

    /// Build the underlying reqwest client.
    pub(crate) fn build_http(&self) -> Result<Client, ClientError> {
        let mut headers = header::HeaderMap::new();
        let accept = header::HeaderValue::from_str(&self.accept).map_err(|e| ClientError::Build(e.to_string()))?;
        headers.insert(header::ACCEPT, accept);

        Client::builder()
            .user_agent(&self.user_agent)
            .default_headers(headers)
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(self.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))
    }
}

/// Raw response of a timed GET.
pub(crate) struct TimedResponse {
    pub status: StatusCode,
    pub headers: header::HeaderMap,
    pub bytes: Bytes,
    pub duration_ms: u64,
}

/// Issue a GET and read the whole body, timing only the network exchange.
pub(crate) async fn timed_get(http: &Client, url: &::url::Url) -> Result<TimedResponse, ClientError> {
    let start = Instant::now();
    let response = http.get(url.as_str()).send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.bytes().await?;
    let duration_ms = start.elapsed().as_millis() as u64;

    Ok(TimedResponse { status, headers, bytes, duration_ms })
}

/// Flatten a header map, lower-casing names and joining repeated values.
fn flatten_headers(headers: &header::HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        out.entry(name.as_str().to_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.clone());
    }
    out
}

/// reqwest-backed [`Probe`].
#[derive(Debug, Clone)]
pub struct HttpProbe {
    http: Client,
    config: ClientConfig,
}

impl HttpProbe {
    /// Create a new probe with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = config.build_http()?;
        Ok(Self { http, config })
    }

    /// Probe an endpoint, returning the client-level error on failure.
    pub async fn snapshot(&self, endpoint: &str) -> Result<Snapshot, ClientError> {
        let url = resolve_endpoint(&self.config.base_url, endpoint).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        let response = timed_get(&self.http, &url).await?;
        let body = Body::parse(&response.bytes);

        tracing::debug!(
            status = response.status.as_u16(),
            duration_ms = response.duration_ms,
            bytes = response.bytes.len(),
            "GET {}",
            endpoint
        );

        Ok(Snapshot {
            url: url.to_string(),
            status: response.status.as_u16(),
            body,
            duration_ms: response.duration_ms,
            headers: flatten_headers(&response.headers),
        })
    }
}

#[async_trait::async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, endpoint: &str) -> Result<Snapshot, Error> {
        self.snapshot(endpoint).await.map_err(|e| e.into_transport(endpoint))
    }
}
