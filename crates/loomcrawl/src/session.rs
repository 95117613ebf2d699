//! Session-level HTTP client configuration (specification §6 "session"
//! block): the defaults a [`crate::Scraper`]'s HTTP adapter is built
//! from, before any per-`Request` `proxy`/`tls_verify` override applies.

use std::time::Duration;

use url::Url;

/// Configuration for the bundled [`loomcrawl_request::ReqwestAdapter`],
/// corresponding to the `session` configuration block.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Per-request network timeout.
    pub timeout: Duration,
    /// Whether TLS certificates are verified by default. A `Request`'s
    /// own `tls_verify: Some(false)` overrides this per request-wins
    /// precedence (see DESIGN.md).
    pub tls_verify: bool,
    /// A default proxy for every request, unless a `Request` sets its
    /// own `proxy` (which always wins).
    pub proxy: Option<Url>,
    /// A `User-Agent` header value applied to every request that does
    /// not already set one.
    pub user_agent: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            tls_verify: true,
            proxy: None,
            user_agent: None,
        }
    }
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Builds a `reqwest::Client` from this configuration, for
    /// [`loomcrawl_request::ReqwestAdapter::new`].
    #[cfg(feature = "reqwest")]
    pub fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout).danger_accept_invalid_certs(!self.tls_verify);

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        builder.build()
    }
}

/// Builder for [`SessionConfig`].
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn tls_verify(mut self, verify: bool) -> Self {
        self.config.tls_verify = verify;
        self
    }

    pub fn proxy(mut self, proxy: Url) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}
