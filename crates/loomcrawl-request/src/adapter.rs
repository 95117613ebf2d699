//! The HTTP adapter boundary (specification §6): the opaque
//! request-dispatch capability the core consumes but does not own.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use loomcrawl_core::TransportError;
use url::Url;

use crate::model::Request;

/// What the adapter hands back on a completed exchange, before the
/// Request Manager wraps it into a [`crate::model::Response`].
#[derive(Debug)]
pub struct RawResponse {
    pub final_url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// The HTTP adapter trait consumed by the Request Manager. The core
/// treats this as an opaque capability; concrete adapters (reqwest,
/// hyper, a test double) live outside the core's contract.
#[async_trait]
pub trait HttpAdapter: Send + Sync {
    /// Executes one request, surfacing transport-level failures as
    /// [`TransportError`]. A non-2xx status is *not* a `TransportError`:
    /// it is a normal `RawResponse` whose `status` the Request Manager
    /// inspects, per specification §4.3 step 5.
    async fn dispatch(&self, request: &Request) -> Result<RawResponse, TransportError>;
}

/// A `reqwest`-backed reference adapter, the default concrete
/// implementation of the opaque dispatch capability. Feature-gated:
/// consumers may substitute their own [`HttpAdapter`] instead.
#[cfg(feature = "reqwest")]
pub struct ReqwestAdapter {
    client: reqwest::Client,
    /// The session's configured per-request timeout, reapplied to the
    /// one-off client built for a per-request proxy/TLS override (the
    /// override only replaces the proxy/TLS policy, not the rest of the
    /// session's configuration).
    timeout: Duration,
    /// The session's configured `User-Agent`, likewise reapplied to a
    /// one-off client.
    user_agent: Option<String>,
}

#[cfg(feature = "reqwest")]
impl ReqwestAdapter {
    /// Builds an adapter from a pre-configured `reqwest::Client` plus the
    /// session settings that client was built from, letting the caller
    /// own TLS, proxy, and timeout policy at the session level
    /// (per-request `proxy`/`tls_verify` overrides in spec's `Request`
    /// take precedence per the request-wins precedence recorded in
    /// DESIGN.md, but the rest of the session's configuration — timeout,
    /// user agent — still applies to a request carrying such an
    /// override).
    pub fn new(client: reqwest::Client, timeout: Duration, user_agent: Option<String>) -> Self {
        Self { client, timeout, user_agent }
    }
}

#[cfg(feature = "reqwest")]
#[async_trait]
impl HttpAdapter for ReqwestAdapter {
    async fn dispatch(&self, request: &Request) -> Result<RawResponse, TransportError> {
        // A per-request proxy or TLS-verify toggle wins over the
        // session-level client (the request-wins precedence recorded in
        // DESIGN.md for spec's Open Question on proxy precedence): build
        // a one-off client for it rather than mutating the shared
        // session client.
        let client = if request.proxy.is_some() || request.tls_verify == Some(false) {
            let mut builder = reqwest::Client::builder().timeout(self.timeout);
            if let Some(user_agent) = &self.user_agent {
                builder = builder.user_agent(user_agent.clone());
            }
            if let Some(proxy_url) = &request.proxy {
                let proxy = reqwest::Proxy::all(proxy_url.as_str())
                    .map_err(|err| TransportError::Protocol(err.to_string()))?;
                builder = builder.proxy(proxy);
            }
            if request.tls_verify == Some(false) {
                builder = builder.danger_accept_invalid_certs(true);
            }
            std::borrow::Cow::Owned(
                builder.build().map_err(|err| TransportError::ConnectionFailed(err.to_string()))?,
            )
        } else {
            std::borrow::Cow::Borrowed(&self.client)
        };

        let mut builder = client.request(request.method.clone(), request.url.clone());
        builder = builder.headers(request.headers.clone());

        if !request.query.is_empty() {
            let pairs: Vec<(String, String)> = request
                .query
                .iter()
                .map(|(name, value)| (name.clone(), query_value_to_string(value)))
                .collect();
            builder = builder.query(&pairs);
        }

        if let Some(body) = &request.body {
            builder = apply_body(builder, body);
        }

        let response = builder.send().await.map_err(|err| classify_reqwest_error(err, self.timeout))?;

        let final_url = Url::parse(response.url().as_str()).unwrap_or_else(|_| request.url.clone());
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| classify_reqwest_error(err, self.timeout))?;

        Ok(RawResponse { final_url, status, headers, body })
    }
}

#[cfg(feature = "reqwest")]
fn query_value_to_string(value: &crate::model::QueryValue) -> String {
    use crate::model::QueryValue;
    match value {
        QueryValue::Str(s) => s.clone(),
        QueryValue::Num(n) => n.to_string(),
        QueryValue::Seq(items) => items.join(","),
    }
}

#[cfg(feature = "reqwest")]
fn apply_body(builder: reqwest::RequestBuilder, body: &crate::model::Body) -> reqwest::RequestBuilder {
    use crate::model::Body;
    match body {
        Body::Bytes(bytes) => builder.body(bytes.clone()),
        Body::Json(value) => builder.json(value),
        Body::Form(fields) => builder.form(fields),
        Body::Multipart(parts) => {
            let mut form = reqwest::multipart::Form::new();
            for part in parts {
                let mut field = reqwest::multipart::Part::bytes(part.data.to_vec());
                if let Some(filename) = &part.filename {
                    field = field.file_name(filename.clone());
                }
                if let Some(content_type) = &part.content_type {
                    if let Ok(field_with_type) = field.mime_str(content_type) {
                        field = field_with_type;
                    }
                }
                form = form.part(part.name.clone(), field);
            }
            builder.multipart(form)
        }
    }
}

#[cfg(feature = "reqwest")]
fn classify_reqwest_error(err: reqwest::Error, configured_timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(configured_timeout)
    } else if err.is_connect() {
        TransportError::ConnectionFailed(err.to_string())
    } else if err.is_decode() || err.is_builder() {
        TransportError::Protocol(err.to_string())
    } else {
        TransportError::ConnectionFailed(err.to_string())
    }
}
