//! Invalidation endpoint client.
//!
//! ### Contract
//! - `GET <base><invalidate_path>?tags=<expression>`
//! - The tag expression is never validated or sanitized: empty strings,
//!   markup and comma-joined lists are sent as-is, percent-encoded only.
//! - Non-200 responses are returned, not raised; the caller judges them.
//! - No retries: the double-call deletion proof depends on each call
//!   happening exactly once.

use reqwest::Client;
use url::Url;

use cachecheck_core::{Error, InvalidationBody, InvalidationResult, Invalidator};

use crate::probe::{ClientConfig, resolve_endpoint, timed_get};
use crate::ClientError;

/// reqwest-backed [`Invalidator`].
#[derive(Debug, Clone)]
pub struct InvalidationClient {
    http: Client,
    endpoint: Url,
}

impl InvalidationClient {
    /// Create a client for the invalidation endpoint at `path` under the base URL.
    pub fn new(config: &ClientConfig, path: &str) -> Result<Self, ClientError> {
        let endpoint = resolve_endpoint(&config.base_url, path).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        let http = config.build_http()?;
        Ok(Self { http, endpoint })
    }

    /// Full URL for a tag expression.
    pub fn url_for(&self, tags: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(Some(&format!("tags={}", encode_component(tags))));
        url
    }

    /// Invalidate, returning the client-level error on transport failure.
    pub async fn call(&self, tags: &str) -> Result<InvalidationResult, ClientError> {
        let url = self.url_for(tags);
        let response = timed_get(&self.http, &url).await?;
        let body = InvalidationBody::parse(&response.bytes);
        let status = response.status.as_u16();

        tracing::debug!(
            status,
            duration_ms = response.duration_ms,
            deleted_keys = ?body.deleted_keys,
            success = ?body.success,
            "INVALIDATE tags={:?}",
            tags
        );

        Ok(InvalidationResult { status, body, duration_ms: response.duration_ms })
    }
}

/// Percent-encode a query component the way browsers' `encodeURIComponent` does.
///
/// Spaces become `%20`; `!`, `'`, `(`, `)`, `~` stay literal.
fn encode_component(value: &str) -> String {
    let form: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    form.replace('+', "%20")
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%7E", "~")
}

#[async_trait::async_trait]
impl Invalidator for InvalidationClient {
    async fn invalidate(&self, tags: &str) -> Result<InvalidationResult, Error> {
        self.call(tags).await.map_err(|e| e.into_transport(self.url_for(tags).as_str()))
    }
}
