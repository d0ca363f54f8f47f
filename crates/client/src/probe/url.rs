//! Endpoint resolution against the configured base URL.

use url::Url;

/// Error type for endpoint resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty endpoint")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve an endpoint to an absolute URL.
///
/// Resolution rules:
/// 1. Trim leading/trailing whitespace
/// 2. Absolute `http(s)://` endpoints are used verbatim
/// 3. Otherwise the endpoint is appended to `base`, keeping any base path
///    prefix and the endpoint's query string intact (not reordered)
pub fn resolve_endpoint(base: &Url, endpoint: &str) -> Result<Url, UrlError> {
    let trimmed = endpoint.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        let prefix = base.as_str().trim_end_matches('/');
        if trimmed.starts_with('/') { format!("{prefix}{trimmed}") } else { format!("{prefix}/{trimmed}") }
    };

    let parsed = Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}

/// Whether `endpoint` starts with `scheme://`.
fn has_scheme(endpoint: &str) -> bool {
    match endpoint.split_once("://") {
        Some((scheme, _)) => {
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
