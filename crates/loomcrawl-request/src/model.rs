//! The Request/Response/Item data model (specification §3).

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::OnceLock;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

/// A single query-parameter value. Mirrors the specification's "ordered
/// mapping of string to string/number/sequence".
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    Num(f64),
    Seq(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Num(value)
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A request body, in one of the shapes the specification names.
#[derive(Debug, Clone)]
pub enum Body {
    Bytes(Bytes),
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Multipart(Vec<Part>),
}

/// A newtype key used by the scraper's handler registry (see
/// `loomcrawl-request::depend`) to name a callback or errback without
/// requiring the handler itself to be `'static` boxed inline in the
/// `Request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub &'static str);

impl HandlerId {
    pub fn new(name: &'static str) -> Self {
        Self(name)
    }
}

/// Opaque, type-erased bag of extra keyword arguments carried from a
/// `Request` to its callback/errback — the Rust analogue of Python kwargs.
///
/// Values are held behind `Arc` rather than `Box` so an `Extra` bag is
/// cheap to clone (a `Request`'s retry re-submission shares the same
/// extras rather than re-building them) and so the same values can be
/// merged directly into a `loomcrawl-request::depend::ParamMap` without
/// copying.
#[derive(Default, Clone)]
pub struct Extra {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Extra {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), Arc::new(value));
    }

    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.values.get(name).and_then(|arc| arc.downcast_ref::<T>())
    }

    pub fn get_any(&self, name: &str) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Any + Send + Sync>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl std::fmt::Debug for Extra {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extra")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A stable identity for one logical request, preserved across retries so
/// logs can correlate an original dispatch with its re-submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

/// Engine-internal annotations on a `Request`, mutated by middlewares and
/// the retry subsystem but never by user code directly.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// A caller-supplied override of the rate-limit group and base
    /// interval, taking precedence over the default group-key function.
    pub group_override: Option<(String, std::time::Duration)>,
    /// The current retry attempt count, starting at 0.
    pub attempt: u32,
    /// Stable identity for logging and retry correlation.
    pub id: RequestId,
    /// Scheduler-assigned sequence number, set on submission.
    pub seq: Option<u64>,
}

impl RequestMeta {
    pub fn new(id: RequestId) -> Self {
        Self {
            group_override: None,
            attempt: 0,
            id,
            seq: None,
        }
    }
}

/// The unit of outbound work (specification §3 "Request").
#[derive(Debug, Clone)]
pub struct Request {
    pub url: Url,
    pub method: Method,
    pub query: Vec<(String, QueryValue)>,
    pub body: Option<Body>,
    pub headers: HeaderMap,
    pub proxy: Option<Url>,
    pub tls_verify: Option<bool>,
    pub callback: Option<HandlerId>,
    pub errback: Option<HandlerId>,
    pub extra: Extra,
    pub priority: i32,
    pub meta: RequestMeta,
}

impl Request {
    /// Creates a GET request to `url` at default priority (0), with a
    /// fresh `RequestId`.
    pub fn get(url: Url, id: RequestId) -> Self {
        Self {
            url,
            method: Method::GET,
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            proxy: None,
            tls_verify: None,
            callback: None,
            errback: None,
            extra: Extra::new(),
            priority: 0,
            meta: RequestMeta::new(id),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_callback(mut self, handler: HandlerId) -> Self {
        self.callback = Some(handler);
        self
    }

    pub fn with_errback(mut self, handler: HandlerId) -> Self {
        self.errback = Some(handler);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_group_override(mut self, group: impl Into<String>, interval: std::time::Duration) -> Self {
        self.meta.group_override = Some((group.into(), interval));
        self
    }

    /// Builds the request's fresh re-submission for the retry subsystem:
    /// same user intent (target, method, body, headers, callback/errback,
    /// extras), attempt counter incremented and sequence number cleared
    /// so the scheduler assigns a fresh one.
    pub fn retry_clone(&self) -> Self {
        let mut next = self.clone();
        next.meta.attempt += 1;
        next.meta.seq = None;
        next
    }
}

impl loomcrawl_ratelimiter::GroupSource for Request {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    fn group_override(&self) -> Option<(loomcrawl_ratelimiter::GroupKey, std::time::Duration)> {
        self.meta
            .group_override
            .as_ref()
            .map(|(key, interval)| (loomcrawl_ratelimiter::GroupKey::new(key.clone()), *interval))
    }
}

/// A lazily-filled body buffer: the network body is read exactly once,
/// but `bytes()`/`text()`/`json()` may each be called more than once
/// afterward.
#[derive(Debug, Default)]
pub struct LazyBody {
    raw: OnceLock<Bytes>,
}

/// Errors from decoding a response body.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BodyError {
    #[error("response body is not valid UTF-8")]
    NotUtf8,
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(String),
}

impl Clone for LazyBody {
    fn clone(&self) -> Self {
        Self::new(self.bytes().clone())
    }
}

impl LazyBody {
    pub fn new(raw: Bytes) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(raw);
        Self { raw: cell }
    }

    pub fn bytes(&self) -> &Bytes {
        self.raw.get().expect("LazyBody must be filled at construction")
    }

    pub fn text(&self) -> Result<&str, BodyError> {
        std::str::from_utf8(self.bytes()).map_err(|_| BodyError::NotUtf8)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, BodyError> {
        serde_json::from_slice(self.bytes()).map_err(|err| BodyError::InvalidJson(err.to_string()))
    }
}

/// Result of a successful network exchange (specification §3 "Response").
///
/// Lives only for the duration of the callback invocation: callbacks
/// borrow it, they do not own it past their own call.
#[derive(Debug, Clone)]
pub struct Response {
    pub request: Arc<Request>,
    pub final_url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    body: LazyBody,
}

impl Response {
    pub fn new(request: Arc<Request>, final_url: Url, status: StatusCode, headers: HeaderMap, raw_body: Bytes) -> Self {
        Self {
            request,
            final_url,
            status,
            headers,
            body: LazyBody::new(raw_body),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        self.body.bytes()
    }

    pub fn text(&self) -> Result<&str, BodyError> {
        self.body.text()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, BodyError> {
        self.body.json()
    }

    /// Reads the `Retry-After` header as a duration, if present and
    /// parseable as either an integer seconds count or an HTTP-date
    /// (only the seconds form is supported; HTTP-date is treated as
    /// absent since the retry/rate-limit subsystems only consume a
    /// relative delay).
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        self.headers
            .get(http::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(std::time::Duration::from_secs)
    }
}
