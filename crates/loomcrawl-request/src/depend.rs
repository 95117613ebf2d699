//! Dependency Resolver (specification §4.6): binds named dependencies to
//! handler parameters at call time.
//!
//! Rust has no runtime parameter introspection, so the "enumerate handler
//! shapes" option from the specification's Open Questions (§9 "Dynamic
//! handler signatures") is the one implemented here: a [`Handler`]
//! statically declares the parameter names it needs via
//! [`Handler::required_params`], computed once at registration rather
//! than introspected per call. [`Resolver::resolve`] merges engine-
//! provided names, request-local extras, and scraper-level dependencies
//! into a single [`ParamMap`] and fails fast if a required name is
//! missing from all three.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use loomcrawl_core::ClientError;

use crate::model::Extra;

/// A named, type-erased value available to a handler call.
#[derive(Default, Clone)]
pub struct ParamMap {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), Arc::new(value));
    }

    pub fn insert_arc(&mut self, name: impl Into<String>, value: Arc<dyn Any + Send + Sync>) {
        self.values.insert(name.into(), value);
    }

    /// Merges `extra`'s entries in, without overwriting names already
    /// present (engine-provided names always win over request extras,
    /// matching the merge order the specification lists: engine-provided,
    /// then request-local extras, then scraper-level dependencies).
    fn merge_extra(&mut self, extra: &Extra) {
        for (name, value) in extra.iter() {
            self.values.entry(name.to_string()).or_insert_with(|| Arc::clone(value));
        }
    }

    fn merge_scraper_deps(&mut self, deps: &HashMap<String, Arc<dyn Any + Send + Sync>>) {
        for (name, value) in deps {
            self.values.entry(name.clone()).or_insert_with(|| Arc::clone(value));
        }
    }

    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.values.get(name).and_then(|arc| arc.downcast_ref::<T>())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// A handler callable through the Dependency Resolver: an entry function,
/// callback, or errback.
#[async_trait::async_trait]
pub trait Handler: Send + Sync {
    /// The handler's registered name, used in `DependencyMissing` errors.
    fn name(&self) -> &str;

    /// Parameter names this handler requires. Missing names with no
    /// matching engine-provided value, request extra, or scraper
    /// dependency fail the call with `ClientError::DependencyMissing`.
    fn required_params(&self) -> &'static [&'static str] {
        &[]
    }

    /// Parameter names this handler accepts but can do without (the
    /// Rust analogue of a keyword argument with a default).
    fn optional_params(&self) -> &'static [&'static str] {
        &[]
    }

    /// Invokes the handler with its resolved parameters.
    async fn call(&self, params: ParamMap) -> Result<(), ClientError>;
}

/// Resolves handler parameters from engine-provided values, request
/// extras, and scraper-level dependencies registered once at startup.
#[derive(Default)]
pub struct Resolver {
    scraper_deps: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a scraper-level dependency, available to every handler
    /// call by name. Read-only once the scraper starts running.
    pub fn register_dependency<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.scraper_deps.insert(name.into(), Arc::new(value));
    }

    /// Resolves and invokes `handler`, merging `engine_provided` (highest
    /// precedence), `extra` (the request's keyword-argument bag), and
    /// this resolver's scraper-level dependencies (lowest precedence).
    pub async fn invoke(
        &self,
        handler: &dyn Handler,
        engine_provided: ParamMap,
        extra: &Extra,
    ) -> Result<(), ClientError> {
        let params = self.resolve(handler, engine_provided, extra)?;
        handler.call(params).await
    }

    /// Builds the merged [`ParamMap`] for `handler` without invoking it,
    /// failing if a required parameter cannot be resolved from any
    /// source.
    pub fn resolve(
        &self,
        handler: &dyn Handler,
        mut engine_provided: ParamMap,
        extra: &Extra,
    ) -> Result<ParamMap, ClientError> {
        engine_provided.merge_extra(extra);
        engine_provided.merge_scraper_deps(&self.scraper_deps);

        for required in handler.required_params() {
            if !engine_provided.contains(required) {
                return Err(ClientError::DependencyMissing {
                    handler: handler.name().to_string(),
                    name: required.to_string(),
                });
            }
        }

        Ok(engine_provided)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Greeter {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Handler for Greeter {
        fn name(&self) -> &str {
            "greeter"
        }

        fn required_params(&self) -> &'static [&'static str] {
            &["name"]
        }

        async fn call(&self, params: ParamMap) -> Result<(), ClientError> {
            let name: &String = params.get("name").expect("checked by resolver");
            assert_eq!(name, "ferris");
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn resolves_from_engine_provided() {
        let resolver = Resolver::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Greeter { calls: Arc::clone(&calls) };

        let mut engine = ParamMap::new();
        engine.insert("name", "ferris".to_string());

        resolver.invoke(&handler, engine, &Extra::new()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolves_from_request_extra_when_not_engine_provided() {
        let resolver = Resolver::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Greeter { calls: Arc::clone(&calls) };

        let mut extra = Extra::new();
        extra.insert("name", "ferris".to_string());

        resolver.invoke(&handler, ParamMap::new(), &extra).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_required_param_fails() {
        let resolver = Resolver::new();
        let handler = Greeter { calls: Arc::new(AtomicUsize::new(0)) };

        let err = resolver.invoke(&handler, ParamMap::new(), &Extra::new()).await.unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[tokio::test]
    async fn engine_provided_wins_over_scraper_dependency() {
        let mut resolver = Resolver::new();
        resolver.register_dependency("name", "scraper-default".to_string());
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Greeter { calls: Arc::clone(&calls) };

        let mut engine = ParamMap::new();
        engine.insert("name", "ferris".to_string());

        resolver.invoke(&handler, engine, &Extra::new()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
