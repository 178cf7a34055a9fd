//! Per-producer registration façade over the shared alias registry.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::handler::{
    same_servlet, ContextId, Filter, FilterDescriptor, FilterInfo, Servlet, ServletContext,
    ServletInfo,
};
use crate::registry::{AliasRegistry, RegistryError};

static NEXT_SERVICE_ID: AtomicI64 = AtomicI64::new(-1);

fn next_service_id() -> i64 {
    NEXT_SERVICE_ID.fetch_sub(1, Ordering::Relaxed)
}

/// An alias is `/`, or starts with `/` and does not end with `/`.
pub fn is_alias_valid(alias: &str) -> bool {
    alias == "/" || (alias.starts_with('/') && !alias.ends_with('/'))
}

/// Registration handle for one producer.
///
/// Everything registered through a handle can be torn down at once with
/// [`HttpService::unregister_all`].
pub struct HttpService {
    registry: Arc<AliasRegistry>,
    context: Arc<ServletContext>,
    servlets: Mutex<Vec<Arc<dyn Servlet>>>,
    filters: Mutex<Vec<Arc<FilterDescriptor>>>,
}

impl HttpService {
    pub fn new(registry: Arc<AliasRegistry>, context: Arc<ServletContext>) -> Self {
        Self {
            registry,
            context,
            servlets: Mutex::new(Vec::new()),
            filters: Mutex::new(Vec::new()),
        }
    }

    pub fn context(&self) -> &Arc<ServletContext> {
        &self.context
    }

    /// Register `servlet` under `alias` with the default ranking.
    pub fn register_servlet(
        &self,
        alias: &str,
        servlet: Arc<dyn Servlet>,
        name: Option<&str>,
        init_params: BTreeMap<String, String>,
    ) -> Result<(), RegistryError> {
        if !is_alias_valid(alias) {
            return Err(RegistryError::InvalidArgument(format!(
                "invalid alias `{}`",
                alias
            )));
        }

        // Held across the registry call; the instance check and the record are one step
        let mut servlets = self.servlets.lock();
        servlets.retain(|s| self.registry.alias_of(s).is_some());
        if servlets.iter().any(|s| same_servlet(s, &servlet)) {
            return Err(RegistryError::InvalidArgument(format!(
                "servlet instance already registered through context `{}`",
                self.context.name()
            )));
        }

        let info = ServletInfo::new(next_service_id(), name.unwrap_or(alias), alias)
            .with_init_params(init_params);

        self.registry
            .register_servlet(alias, self.context.clone(), servlet.clone(), info)?;
        servlets.push(servlet);
        Ok(())
    }

    /// Register `filter` for paths under `pattern`.
    pub fn register_filter(
        &self,
        pattern: &str,
        filter: Arc<dyn Filter>,
        name: Option<&str>,
        ranking: i32,
    ) -> Result<Arc<FilterDescriptor>, RegistryError> {
        if !is_alias_valid(pattern) {
            return Err(RegistryError::InvalidArgument(format!(
                "invalid filter pattern `{}`",
                pattern
            )));
        }

        let info =
            FilterInfo::new(next_service_id(), name.unwrap_or(pattern), pattern).with_ranking(ranking);
        let descriptor = Arc::new(FilterDescriptor::new(
            ContextId::DIRECT,
            self.context.clone(),
            info,
            filter,
        ));

        self.registry.register_filter(descriptor.clone())?;
        self.filters.lock().push(descriptor.clone());
        Ok(descriptor)
    }

    /// Unregister the servlet at `alias`, destroying it.
    pub fn unregister(&self, alias: &str) -> Result<Arc<dyn Servlet>, RegistryError> {
        let servlet = self.registry.unregister(alias)?;
        let mut servlets = self.servlets.lock();
        if let Some(position) = servlets.iter().position(|s| same_servlet(s, &servlet)) {
            servlets.remove(position);
        }
        Ok(servlet)
    }

    /// Unregister a filter previously returned by [`HttpService::register_filter`].
    pub fn unregister_filter(&self, descriptor: &Arc<FilterDescriptor>) {
        self.registry.unregister_filter(Some(descriptor.as_ref()), true);
        self.filters.lock().retain(|d| !Arc::ptr_eq(d, descriptor));
    }

    /// Tear down everything registered through this handle.
    ///
    /// Entries already removed elsewhere are skipped silently.
    pub fn unregister_all(&self) {
        let servlets = std::mem::take(&mut *self.servlets.lock());
        let filters = std::mem::take(&mut *self.filters.lock());

        for servlet in &servlets {
            self.registry.unregister_servlet(Some(servlet), true);
        }
        for filter in &filters {
            self.registry.unregister_filter(Some(filter.as_ref()), true);
        }

        tracing::info!(
            context = %self.context.name(),
            servlets = servlets.len(),
            filters = filters.len(),
            "Producer registrations released"
        );
    }
}
