//! In-memory handler registry ordered by ranking.
//!
//! # Responsibilities
//! - Install servlets and filters (running their init step)
//! - Keep each set sorted: ranking descending, then service id ascending
//! - Resolve a request path to a servlet and its filter chain
//!
//! # Design Decisions
//! - Writers serialize on one mutex and publish a fresh snapshot
//! - Readers load the current snapshot through `ArcSwap` without locking
//! - Pattern `/` matches every path; any other pattern `p` matches `p`
//!   itself and paths below `p/`
//! - Longest matching pattern wins; ties go to the higher ranking

use std::cmp::Ordering;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::handler::context::ContextId;
use crate::handler::descriptor::{FilterDescriptor, ServletDescriptor};
use crate::handler::info::{FilterInfo, ServletInfo};
use crate::handler::registry::{HandlerError, HandlerRegistry};

/// Common view over servlet and filter descriptors for ordering and lookup.
trait Ranked {
    fn key(&self) -> (ContextId, i64);
    fn ranking(&self) -> i32;
    fn name(&self) -> &str;
    fn patterns(&self) -> &[String];
}

impl Ranked for ServletDescriptor {
    fn key(&self) -> (ContextId, i64) {
        (self.context_id(), self.info().service_id)
    }
    fn ranking(&self) -> i32 {
        self.info().ranking
    }
    fn name(&self) -> &str {
        &self.info().name
    }
    fn patterns(&self) -> &[String] {
        &self.info().patterns
    }
}

impl Ranked for FilterDescriptor {
    fn key(&self) -> (ContextId, i64) {
        (self.context_id(), self.info().service_id)
    }
    fn ranking(&self) -> i32 {
        self.info().ranking
    }
    fn name(&self) -> &str {
        &self.info().name
    }
    fn patterns(&self) -> &[String] {
        &self.info().patterns
    }
}

fn by_rank<T: Ranked>(a: &Arc<T>, b: &Arc<T>) -> Ordering {
    b.ranking()
        .cmp(&a.ranking())
        .then_with(|| a.key().1.cmp(&b.key().1))
}

/// Returns true if `pattern` covers `path`.
pub fn pattern_matches(pattern: &str, path: &str) -> bool {
    if pattern == "/" {
        return true;
    }
    match path.strip_prefix(pattern) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Handler registry keeping ranked, immutable snapshots.
#[derive(Debug)]
pub struct RankedHandlerRegistry {
    servlets: ArcSwap<Vec<Arc<ServletDescriptor>>>,
    filters: ArcSwap<Vec<Arc<FilterDescriptor>>>,
    writer: Mutex<()>,
}

impl RankedHandlerRegistry {
    pub fn new() -> Self {
        Self {
            servlets: ArcSwap::from_pointee(Vec::new()),
            filters: ArcSwap::from_pointee(Vec::new()),
            writer: Mutex::new(()),
        }
    }

    /// Resolve the servlet answering `path`.
    pub fn resolve_servlet(&self, path: &str) -> Option<Arc<ServletDescriptor>> {
        let snapshot = self.servlets.load();
        let mut best: Option<(usize, &Arc<ServletDescriptor>)> = None;

        for descriptor in snapshot.iter() {
            for pattern in descriptor.patterns() {
                if !pattern_matches(pattern, path) {
                    continue;
                }
                // Snapshot is rank-ordered, so strict > keeps the higher ranking on ties
                if best.map_or(true, |(len, _)| pattern.len() > len) {
                    best = Some((pattern.len(), descriptor));
                }
            }
        }

        best.map(|(_, descriptor)| descriptor.clone())
    }

    /// Filters covering `path`, in the order they must run.
    pub fn filters_for(&self, path: &str) -> Vec<Arc<FilterDescriptor>> {
        self.filters
            .load()
            .iter()
            .filter(|d| d.patterns().iter().any(|p| pattern_matches(p, path)))
            .cloned()
            .collect()
    }

    /// Snapshot of installed servlets in rank order.
    pub fn servlets(&self) -> Arc<Vec<Arc<ServletDescriptor>>> {
        self.servlets.load_full()
    }

    pub fn servlet_count(&self) -> usize {
        self.servlets.load().len()
    }

    pub fn filter_count(&self) -> usize {
        self.filters.load().len()
    }

    fn install<T: Ranked>(
        &self,
        slot: &ArcSwap<Vec<Arc<T>>>,
        descriptor: Arc<T>,
        init: impl FnOnce(&T) -> Result<(), HandlerError>,
    ) -> Result<(), HandlerError> {
        let _writer = self.writer.lock();
        let current = slot.load_full();

        let (context_id, service_id) = descriptor.key();
        if current.iter().any(|d| d.key() == (context_id, service_id)) {
            return Err(HandlerError::AlreadyInstalled {
                context_id,
                service_id,
            });
        }

        init(descriptor.as_ref())?;

        let mut next = current.to_vec();
        next.push(descriptor);
        next.sort_by(by_rank);
        slot.store(Arc::new(next));
        Ok(())
    }

    fn uninstall<T: Ranked>(
        &self,
        slot: &ArcSwap<Vec<Arc<T>>>,
        key: (ContextId, i64),
    ) -> Option<Arc<T>> {
        let _writer = self.writer.lock();
        let current = slot.load_full();
        let position = current.iter().position(|d| d.key() == key)?;

        let mut next = current.to_vec();
        let removed = next.remove(position);
        slot.store(Arc::new(next));
        Some(removed)
    }
}

impl Default for RankedHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry for RankedHandlerRegistry {
    fn add_filter(&self, descriptor: Arc<FilterDescriptor>) -> Result<(), HandlerError> {
        self.install(&self.filters, descriptor, |d| {
            d.init().map_err(|source| HandlerError::Init {
                name: d.info().name.clone(),
                source,
            })
        })?;
        tracing::debug!(filters = self.filter_count(), "Filter installed");
        Ok(())
    }

    fn add_servlet(&self, descriptor: Arc<ServletDescriptor>) -> Result<(), HandlerError> {
        self.install(&self.servlets, descriptor, |d| {
            d.init().map_err(|source| HandlerError::Init {
                name: d.info().name.clone(),
                source,
            })
        })?;
        tracing::debug!(servlets = self.servlet_count(), "Servlet installed");
        Ok(())
    }

    fn remove_servlet(&self, context_id: ContextId, info: &ServletInfo, destroy: bool) {
        match self.uninstall(&self.servlets, (context_id, info.service_id)) {
            Some(removed) => {
                if destroy {
                    removed.destroy();
                }
                tracing::debug!(name = %removed.name(), destroy, "Servlet uninstalled");
            }
            None => {
                tracing::debug!(
                    context_id = %context_id,
                    service_id = info.service_id,
                    "Servlet not installed, nothing to remove"
                );
            }
        }
    }

    fn remove_filter(&self, context_id: ContextId, info: &FilterInfo, destroy: bool) {
        match self.uninstall(&self.filters, (context_id, info.service_id)) {
            Some(removed) => {
                if destroy {
                    removed.destroy();
                }
                tracing::debug!(name = %removed.name(), destroy, "Filter uninstalled");
            }
            None => {
                tracing::debug!(
                    context_id = %context_id,
                    service_id = info.service_id,
                    "Filter not installed, nothing to remove"
                );
            }
        }
    }
}
