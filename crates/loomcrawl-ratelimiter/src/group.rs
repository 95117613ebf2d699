//! Group keys and the source trait used to derive them from whatever the
//! caller is about to dispatch.

use std::time::Duration;

/// Identifies a rate-limit group. Usually a request's URL host, but
/// callers may supply their own via [`GroupSource::group_override`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(pub String);

impl GroupKey {
    /// Creates a group key from any string-like value.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that can be mapped to a rate-limit group.
///
/// `loomcrawl-request::model::Request` implements this so the limiter can
/// stay decoupled from the request data model (the rate limiter crate sits
/// below `loomcrawl-request` in the dependency order).
pub trait GroupSource {
    /// The absolute URL this dispatch is headed to.
    fn url(&self) -> &str;

    /// A per-request override of `(group_key, base_interval)`, taking
    /// precedence over the default group-key function's result.
    fn group_override(&self) -> Option<(GroupKey, Duration)> {
        None
    }
}

/// Derives a `(GroupKey, base_interval)` pair from a [`GroupSource`].
pub trait GroupKeyFn<S: GroupSource>: Send + Sync {
    /// Computes the group key and base interval for `source`.
    fn group_for(&self, source: &S, default_interval: Duration) -> (GroupKey, Duration);
}

/// Default group-key function: one group per URL host, at
/// `config.default_interval`, unless the source overrides it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostGroupKeyFn;

impl<S: GroupSource> GroupKeyFn<S> for HostGroupKeyFn {
    fn group_for(&self, source: &S, default_interval: Duration) -> (GroupKey, Duration) {
        if let Some(overridden) = source.group_override() {
            return overridden;
        }

        let host = url::Url::parse(source.url())
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
            .unwrap_or_else(|| source.url().to_string());

        (GroupKey::new(host), default_interval)
    }
}
