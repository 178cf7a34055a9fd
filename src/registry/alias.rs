//! The alias table and its critical section.
//!
//! # Responsibilities
//! - Guarantee at most one servlet per alias
//! - Keep the alias table and the handler registry in lock-step
//! - Return the removed servlet to the caller on unregistration
//!
//! # Design Decisions
//! - `parking_lot::Mutex` scoped to the table; held across handler registry calls
//! - Identity removal is a linear scan; aliases map 1:1 to servlets by construction
//! - "Not found" is an error for alias removal but a no-op for identity
//!   and filter removal, where callers may be cleaning up twice

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::handler::{
    same_servlet, ContextId, FilterDescriptor, HandlerRegistry, Servlet, ServletContext,
    ServletDescriptor, ServletInfo,
};
use crate::observability::metrics;
use crate::registry::error::RegistryError;

/// Owner of the alias → servlet descriptor mapping.
pub struct AliasRegistry {
    handlers: Arc<dyn HandlerRegistry>,
    aliases: Mutex<HashMap<String, Arc<ServletDescriptor>>>,
}

impl AliasRegistry {
    /// Create a registry installing into `handlers`.
    pub fn new(handlers: Arc<dyn HandlerRegistry>) -> Self {
        Self {
            handlers,
            aliases: Mutex::new(HashMap::new()),
        }
    }

    pub fn builder() -> AliasRegistryBuilder {
        AliasRegistryBuilder::default()
    }

    /// Install a filter. Filters are not alias-keyed and never uniqueness-checked here.
    pub fn register_filter(&self, descriptor: Arc<FilterDescriptor>) -> Result<(), RegistryError> {
        let name = descriptor.info().name.clone();
        match self.handlers.add_filter(descriptor) {
            Ok(()) => {
                metrics::record_registry_op("register_filter", "ok");
                tracing::info!(filter = %name, "Filter registered");
                Ok(())
            }
            Err(e) => {
                let err = RegistryError::from(e);
                metrics::record_registry_op("register_filter", err.kind());
                tracing::warn!(filter = %name, error = %err, "Filter registration failed");
                Err(err)
            }
        }
    }

    /// Register `servlet` under `alias`.
    ///
    /// Fails with [`RegistryError::DuplicateAlias`] if the alias is taken and
    /// with [`RegistryError::Install`] if the handler registry refuses the
    /// servlet; in both cases the table is left untouched.
    pub fn register_servlet(
        &self,
        alias: &str,
        context: Arc<ServletContext>,
        servlet: Arc<dyn Servlet>,
        info: ServletInfo,
    ) -> Result<(), RegistryError> {
        if alias.is_empty() {
            metrics::record_registry_op("register_servlet", "invalid_argument");
            return Err(RegistryError::InvalidArgument(
                "alias must not be empty".to_string(),
            ));
        }

        let descriptor = Arc::new(ServletDescriptor::new(
            ContextId::DIRECT,
            context,
            info,
            servlet,
        ));

        let mut aliases = self.aliases.lock();
        if aliases.contains_key(alias) {
            metrics::record_registry_op("register_servlet", "duplicate_alias");
            tracing::warn!(alias = %alias, "Alias already in use");
            return Err(RegistryError::DuplicateAlias(alias.to_string()));
        }

        if let Err(e) = self.handlers.add_servlet(descriptor.clone()) {
            let err = RegistryError::from(e);
            metrics::record_registry_op("register_servlet", err.kind());
            tracing::warn!(alias = %alias, error = %err, "Servlet installation failed");
            return Err(err);
        }

        tracing::info!(
            alias = %alias,
            servlet = %descriptor.info().name,
            service_id = descriptor.info().service_id,
            "Servlet registered"
        );
        aliases.insert(alias.to_string(), descriptor);
        metrics::record_registry_op("register_servlet", "ok");
        metrics::record_alias_count(aliases.len());
        Ok(())
    }

    /// Remove whatever is registered at `alias`, destroying it, and hand the servlet back.
    pub fn unregister(&self, alias: &str) -> Result<Arc<dyn Servlet>, RegistryError> {
        let mut aliases = self.aliases.lock();
        let Some(descriptor) = aliases.remove(alias) else {
            metrics::record_registry_op("unregister", "alias_not_found");
            return Err(RegistryError::AliasNotFound(alias.to_string()));
        };

        self.handlers
            .remove_servlet(descriptor.context_id(), descriptor.info(), true);

        tracing::info!(alias = %alias, servlet = %descriptor.info().name, "Servlet unregistered");
        metrics::record_registry_op("unregister", "ok");
        metrics::record_alias_count(aliases.len());
        Ok(descriptor.servlet().clone())
    }

    /// Remove the alias owned by `servlet`, if any. Absent input or no match is a no-op.
    pub fn unregister_servlet(&self, servlet: Option<&Arc<dyn Servlet>>, destroy: bool) {
        let Some(servlet) = servlet else {
            return;
        };

        let mut aliases = self.aliases.lock();
        let owner = aliases
            .iter()
            .find(|(_, descriptor)| same_servlet(descriptor.servlet(), servlet))
            .map(|(alias, _)| alias.clone());

        let Some(alias) = owner else {
            tracing::debug!("Servlet not registered under any alias, nothing to remove");
            return;
        };

        if let Some(descriptor) = aliases.remove(&alias) {
            self.handlers
                .remove_servlet(descriptor.context_id(), descriptor.info(), destroy);
            tracing::info!(alias = %alias, destroy, "Servlet unregistered by identity");
            metrics::record_registry_op("unregister_servlet", "ok");
            metrics::record_alias_count(aliases.len());
        }
    }

    /// Remove a filter from the handler registry. Absent input is a no-op.
    pub fn unregister_filter(&self, filter: Option<&FilterDescriptor>, destroy: bool) {
        if let Some(filter) = filter {
            self.handlers
                .remove_filter(filter.context_id(), filter.info(), destroy);
            tracing::info!(filter = %filter.info().name, destroy, "Filter unregistered");
            metrics::record_registry_op("unregister_filter", "ok");
        }
    }

    /// Remove every alias, returning the servlets that were registered.
    pub fn unregister_all(&self, destroy: bool) -> Vec<Arc<dyn Servlet>> {
        let mut aliases = self.aliases.lock();
        let mut drained: Vec<(String, Arc<ServletDescriptor>)> = aliases.drain().collect();
        drained.sort_by(|a, b| a.0.cmp(&b.0));

        let mut servlets = Vec::with_capacity(drained.len());
        for (alias, descriptor) in drained {
            self.handlers
                .remove_servlet(descriptor.context_id(), descriptor.info(), destroy);
            tracing::debug!(alias = %alias, destroy, "Servlet unregistered in bulk");
            servlets.push(descriptor.servlet().clone());
        }

        tracing::info!(count = servlets.len(), "All aliases unregistered");
        metrics::record_registry_op("unregister_all", "ok");
        metrics::record_alias_count(0);
        servlets
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.lock().contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.aliases.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.lock().is_empty()
    }

    /// Registered aliases, sorted.
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self.aliases.lock().keys().cloned().collect();
        aliases.sort();
        aliases
    }

    /// The alias `servlet` is registered under, if any.
    pub fn alias_of(&self, servlet: &Arc<dyn Servlet>) -> Option<String> {
        self.aliases
            .lock()
            .iter()
            .find(|(_, descriptor)| same_servlet(descriptor.servlet(), servlet))
            .map(|(alias, _)| alias.clone())
    }

    pub fn descriptor(&self, alias: &str) -> Option<Arc<ServletDescriptor>> {
        self.aliases.lock().get(alias).cloned()
    }

    /// Sorted snapshot of the table.
    pub fn entries(&self) -> Vec<(String, Arc<ServletDescriptor>)> {
        let mut entries: Vec<_> = self
            .aliases
            .lock()
            .iter()
            .map(|(alias, descriptor)| (alias.clone(), descriptor.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl fmt::Debug for AliasRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AliasRegistry")
            .field("aliases", &self.aliases())
            .finish_non_exhaustive()
    }
}

/// Builder checking that a handler registry was supplied.
#[derive(Default)]
pub struct AliasRegistryBuilder {
    handlers: Option<Arc<dyn HandlerRegistry>>,
}

impl AliasRegistryBuilder {
    pub fn handler_registry(mut self, handlers: Arc<dyn HandlerRegistry>) -> Self {
        self.handlers = Some(handlers);
        self
    }

    pub fn build(self) -> Result<AliasRegistry, RegistryError> {
        let handlers = self.handlers.ok_or_else(|| {
            RegistryError::InvalidArgument("handler registry is required".to_string())
        })?;
        Ok(AliasRegistry::new(handlers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{FilterInfo, FilterOutcome, Filter, HandlerError, ServletError};
    use axum::body::{Body, Bytes};
    use axum::http::{Request, Response};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        AddServlet(i64),
        AddFilter(i64),
        RemoveServlet(i64, bool),
        RemoveFilter(i64, bool),
    }

    /// Handler registry that records calls and can be told to refuse installs.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<Call>>,
        refuse: AtomicBool,
    }

    impl Recorder {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }
    }

    impl HandlerRegistry for Recorder {
        fn add_filter(&self, descriptor: Arc<FilterDescriptor>) -> Result<(), HandlerError> {
            self.calls.lock().push(Call::AddFilter(descriptor.info().service_id));
            Ok(())
        }

        fn add_servlet(&self, descriptor: Arc<ServletDescriptor>) -> Result<(), HandlerError> {
            if self.refuse.load(Ordering::SeqCst) {
                return Err(HandlerError::Init {
                    name: descriptor.info().name.clone(),
                    source: ServletError::Init("refused".into()),
                });
            }
            self.calls.lock().push(Call::AddServlet(descriptor.info().service_id));
            Ok(())
        }

        fn remove_servlet(&self, _context_id: ContextId, info: &ServletInfo, destroy: bool) {
            self.calls.lock().push(Call::RemoveServlet(info.service_id, destroy));
        }

        fn remove_filter(&self, _context_id: ContextId, info: &FilterInfo, destroy: bool) {
            self.calls.lock().push(Call::RemoveFilter(info.service_id, destroy));
        }
    }

    struct Echo;

    impl Servlet for Echo {
        fn service(&self, _request: &Request<Bytes>) -> Response<Body> {
            Response::new(Body::empty())
        }
    }

    struct PassThrough;

    impl Filter for PassThrough {
        fn do_filter(&self, _request: &Request<Bytes>) -> FilterOutcome {
            FilterOutcome::Continue
        }
    }

    fn setup() -> (Arc<Recorder>, AliasRegistry) {
        let recorder = Arc::new(Recorder::default());
        let registry = AliasRegistry::new(recorder.clone());
        (recorder, registry)
    }

    fn ctx() -> Arc<ServletContext> {
        Arc::new(ServletContext::new("test"))
    }

    #[test]
    fn test_builder_requires_handler_registry() {
        let err = AliasRegistry::builder().build().unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));

        let registry = AliasRegistry::builder()
            .handler_registry(Arc::new(Recorder::default()))
            .build()
            .unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_installs_then_records() {
        let (recorder, registry) = setup();
        registry
            .register_servlet("/a", ctx(), Arc::new(Echo), ServletInfo::new(-1, "a", "/a"))
            .unwrap();

        assert_eq!(recorder.calls(), vec![Call::AddServlet(-1)]);
        assert!(registry.contains("/a"));
        let descriptor = registry.descriptor("/a").unwrap();
        assert_eq!(descriptor.context_id(), ContextId::DIRECT);
        assert_eq!(descriptor.ranking(), 0);
    }

    #[test]
    fn test_empty_alias_rejected() {
        let (recorder, registry) = setup();
        let err = registry
            .register_servlet("", ctx(), Arc::new(Echo), ServletInfo::new(-1, "a", ""))
            .unwrap_err();

        assert!(matches!(err, RegistryError::InvalidArgument(_)));
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn test_duplicate_alias_takes_no_action() {
        let (recorder, registry) = setup();
        registry
            .register_servlet("/a", ctx(), Arc::new(Echo), ServletInfo::new(-1, "a", "/a"))
            .unwrap();
        let err = registry
            .register_servlet("/a", ctx(), Arc::new(Echo), ServletInfo::new(-2, "b", "/a"))
            .unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateAlias(ref a) if a == "/a"));
        assert_eq!(recorder.calls(), vec![Call::AddServlet(-1)]);
        assert_eq!(registry.descriptor("/a").unwrap().info().service_id, -1);
    }

    #[test]
    fn test_failed_install_records_nothing() {
        let (recorder, registry) = setup();
        recorder.refuse.store(true, Ordering::SeqCst);

        let err = registry
            .register_servlet("/a", ctx(), Arc::new(Echo), ServletInfo::new(-1, "a", "/a"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Install(_)));
        assert!(!registry.contains("/a"));

        recorder.refuse.store(false, Ordering::SeqCst);
        registry
            .register_servlet("/a", ctx(), Arc::new(Echo), ServletInfo::new(-2, "a", "/a"))
            .unwrap();
        assert!(registry.contains("/a"));
    }

    #[test]
    fn test_unregister_destroys_and_returns_servlet() {
        let (recorder, registry) = setup();
        let servlet: Arc<dyn Servlet> = Arc::new(Echo);
        registry
            .register_servlet("/a", ctx(), servlet.clone(), ServletInfo::new(-1, "a", "/a"))
            .unwrap();

        let removed = registry.unregister("/a").unwrap();
        assert!(same_servlet(&removed, &servlet));
        assert_eq!(
            recorder.calls(),
            vec![Call::AddServlet(-1), Call::RemoveServlet(-1, true)]
        );

        assert!(matches!(
            registry.unregister("/a"),
            Err(RegistryError::AliasNotFound(_))
        ));
    }

    #[test]
    fn test_unregister_by_identity_threads_destroy_flag() {
        let (recorder, registry) = setup();
        let a: Arc<dyn Servlet> = Arc::new(Echo);
        let b: Arc<dyn Servlet> = Arc::new(Echo);
        registry
            .register_servlet("/a", ctx(), a.clone(), ServletInfo::new(-1, "a", "/a"))
            .unwrap();
        registry
            .register_servlet("/b", ctx(), b.clone(), ServletInfo::new(-2, "b", "/b"))
            .unwrap();

        registry.unregister_servlet(Some(&a), false);
        assert!(!registry.contains("/a"));
        assert!(registry.contains("/b"));
        assert_eq!(recorder.calls().last(), Some(&Call::RemoveServlet(-1, false)));

        // Repeat and absent input are silent
        registry.unregister_servlet(Some(&a), true);
        registry.unregister_servlet(None, true);
        assert_eq!(recorder.calls().len(), 3);
    }

    #[test]
    fn test_filters_bypass_alias_table() {
        let (recorder, registry) = setup();
        registry
            .register_servlet("/a", ctx(), Arc::new(Echo), ServletInfo::new(-1, "a", "/a"))
            .unwrap();

        let filter = Arc::new(FilterDescriptor::new(
            ContextId(3),
            ctx(),
            FilterInfo::new(-9, "f", "/"),
            Arc::new(PassThrough),
        ));
        registry.register_filter(filter.clone()).unwrap();
        registry.unregister_filter(Some(filter.as_ref()), true);
        registry.unregister_filter(None, true);

        assert_eq!(registry.aliases(), vec!["/a".to_string()]);
        assert_eq!(
            recorder.calls(),
            vec![
                Call::AddServlet(-1),
                Call::AddFilter(-9),
                Call::RemoveFilter(-9, true)
            ]
        );
    }

    #[test]
    fn test_unregister_all_drains_table() {
        let (recorder, registry) = setup();
        for (i, alias) in ["/x", "/y", "/z"].iter().enumerate() {
            let id = -(i as i64) - 1;
            registry
                .register_servlet(alias, ctx(), Arc::new(Echo), ServletInfo::new(id, *alias, *alias))
                .unwrap();
        }

        let removed = registry.unregister_all(true);
        assert_eq!(removed.len(), 3);
        assert!(registry.is_empty());
        let removals = recorder
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::RemoveServlet(_, true)))
            .count();
        assert_eq!(removals, 3);
    }
}
