//! In-memory tagged cache used to drive the engine in tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cachecheck_core::{
    Body, Error, InvalidationBody, InvalidationResult, Invalidator, Probe, Snapshot, SpotCheck, TagConfig,
};
use serde_json::{Value, json};

#[derive(Default)]
struct State {
    /// Origin data per endpoint.
    origin: HashMap<String, Value>,
    /// Tags attached to an endpoint's cache entry.
    tags: HashMap<String, Vec<String>>,
    /// Cached bodies.
    cache: HashMap<String, Value>,
    status: HashMap<String, u16>,
    /// Origin changes applied on the first invalidation call.
    on_invalidate: Vec<(String, Value)>,
    /// Extra endpoints evicted by every invalidation call.
    over_reach: Vec<String>,
    /// `(endpoint, n)`: the n-th read of endpoint returns null.
    glitch: Option<(String, usize)>,
    reads: HashMap<String, usize>,
    invalidate_status: Option<u16>,
    crash_on: Option<String>,
    omit_deleted_keys: bool,
    phantom_deletes: bool,
    report_failure: bool,
    delay: Option<Duration>,
    invalidations: usize,
    calls: Vec<String>,
}

/// Fake origin plus tagged cache behind both engine seams.
#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint, its origin body and its cache tags.
    pub fn endpoint(self, path: &str, body: Value, tags: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.origin.insert(path.to_string(), body);
            state.tags.insert(path.to_string(), tags.iter().map(|t| t.to_string()).collect());
        }
        self
    }

    /// Register an endpoint that is already cached, as if another page warmed it.
    pub fn primed(self, path: &str, body: Value, tags: &[&str]) -> Self {
        let this = self.endpoint(path, body.clone(), tags);
        this.with(|s| {
            s.cache.insert(path.to_string(), body);
        })
    }

    fn with(self, f: impl FnOnce(&mut State)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn status(self, path: &str, status: u16) -> Self {
        self.with(|s| {
            s.status.insert(path.to_string(), status);
        })
    }

    pub fn change_on_invalidate(self, path: &str, body: Value) -> Self {
        self.with(|s| s.on_invalidate.push((path.to_string(), body)))
    }

    pub fn over_reach(self, path: &str) -> Self {
        self.with(|s| s.over_reach.push(path.to_string()))
    }

    pub fn glitch(self, path: &str, nth_read: usize) -> Self {
        self.with(|s| s.glitch = Some((path.to_string(), nth_read)))
    }

    pub fn invalidate_status(self, status: u16) -> Self {
        self.with(|s| s.invalidate_status = Some(status))
    }

    pub fn crash_on(self, payload: &str) -> Self {
        self.with(|s| s.crash_on = Some(payload.to_string()))
    }

    pub fn omit_deleted_keys(self) -> Self {
        self.with(|s| s.omit_deleted_keys = true)
    }

    pub fn phantom_deletes(self) -> Self {
        self.with(|s| s.phantom_deletes = true)
    }

    pub fn report_failure(self) -> Self {
        self.with(|s| s.report_failure = true)
    }

    pub fn delay(self, delay: Duration) -> Self {
        self.with(|s| s.delay = Some(delay))
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn invalidation_calls(&self) -> Vec<String> {
        self.calls().into_iter().filter(|c| c.starts_with("INVALIDATE")).collect()
    }
}

#[async_trait::async_trait]
impl Probe for FakeBackend {
    async fn probe(&self, endpoint: &str) -> Result<Snapshot, Error> {
        let delay = self.state.lock().unwrap().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("GET {endpoint}"));
        let reads = {
            let n = state.reads.entry(endpoint.to_string()).or_default();
            *n += 1;
            *n
        };

        let Some(origin) = state.origin.get(endpoint).cloned() else {
            return Err(Error::Transport { url: endpoint.to_string(), message: "connection refused".into() });
        };
        let status = state.status.get(endpoint).copied().unwrap_or(200);

        let glitched = matches!(&state.glitch, Some((path, n)) if path == endpoint && *n == reads);
        let value = if glitched {
            Value::Null
        } else if status != 200 {
            json!({ "error": "upstream" })
        } else {
            state.cache.entry(endpoint.to_string()).or_insert(origin).clone()
        };

        Ok(Snapshot {
            url: format!("http://fake{endpoint}"),
            status,
            body: Body::Json(value),
            duration_ms: 1,
            headers: Default::default(),
        })
    }
}

#[async_trait::async_trait]
impl Invalidator for FakeBackend {
    async fn invalidate(&self, tags: &str) -> Result<InvalidationResult, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("INVALIDATE {tags}"));
        state.invalidations += 1;

        if state.crash_on.as_deref() == Some(tags) {
            return Ok(result(500, InvalidationBody::parse(b"Internal Server Error")));
        }
        if let Some(status) = state.invalidate_status {
            return Ok(result(status, InvalidationBody::parse(br#"{"error":"nope"}"#)));
        }

        if state.invalidations == 1 {
            let changes = std::mem::take(&mut state.on_invalidate);
            for (path, body) in changes {
                state.origin.insert(path, body);
            }
        }

        let wanted: HashSet<&str> = tags.split(',').filter(|t| !t.is_empty()).collect();
        let doomed: Vec<String> = state
            .cache
            .keys()
            .filter(|path| {
                state.tags.get(*path).is_some_and(|t| t.iter().any(|t| wanted.contains(t.as_str())))
                    || state.over_reach.contains(*path)
            })
            .cloned()
            .collect();
        for path in &doomed {
            state.cache.remove(path);
        }

        let deleted = if state.phantom_deletes { doomed.len().max(1) } else { doomed.len() };
        let mut body = json!({ "success": !state.report_failure, "tags": wanted.iter().collect::<Vec<_>>() });
        if !state.omit_deleted_keys {
            body["deletedKeys"] = json!(deleted);
        }
        Ok(result(200, InvalidationBody::parse(body.to_string().as_bytes())))
    }
}

fn result(status: u16, body: InvalidationBody) -> InvalidationResult {
    InvalidationResult { status, body, duration_ms: 1 }
}

pub(crate) fn tag(label: &str, tag: &str, endpoints: &[&str]) -> TagConfig {
    TagConfig { label: label.into(), tag: tag.into(), endpoints: endpoints.iter().map(|e| e.to_string()).collect() }
}

pub(crate) fn spot(domain: &str, path: &str) -> SpotCheck {
    SpotCheck { domain: domain.into(), path: path.into(), label: format!("{domain} spot check") }
}

/// Four domains, each with one endpoint and one spot check.
pub(crate) fn backend() -> FakeBackend {
    FakeBackend::new()
        .endpoint("/v1/bank", json!({ "items": [{ "id": 1, "name": "HDFC" }] }), &["bank"])
        .endpoint("/v1/bank/2", json!({ "id": 2, "name": "ICICI" }), &["bank"])
        .endpoint("/v1/category", json!({ "items": [{ "id": 7, "slug": "trucks" }] }), &["category"])
        .endpoint("/v1/brand", json!({ "items": ["tata", "eicher"] }), &["brand"])
        .endpoint("/v1/city", json!({ "items": ["pune"] }), &["city"])
}

pub(crate) fn spot_checks() -> Vec<SpotCheck> {
    vec![
        spot("bank", "/v1/bank"),
        spot("category", "/v1/category"),
        spot("brand", "/v1/brand"),
        spot("city", "/v1/city"),
    ]
}
