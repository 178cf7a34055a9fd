//! The handler registry contract.
//!
//! # Responsibilities
//! - Store handlers in dispatch-ready form
//! - Run `init` on install and `destroy` on destroying removal
//!
//! # Design Decisions
//! - Installs are fallible (init may fail, duplicates are refused)
//! - Removals are infallible; removing something absent is a no-op
//! - Callers may hold their own locks across these calls, so
//!   implementations must never call back into the caller

use std::sync::Arc;

use thiserror::Error;

use crate::handler::context::ContextId;
use crate::handler::descriptor::{FilterDescriptor, ServletDescriptor};
use crate::handler::info::{FilterInfo, ServletInfo};
use crate::handler::servlet::ServletError;

/// Errors raised while installing a handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A handler with the same context and service id is already installed.
    #[error("handler {service_id} already installed in context {context_id}")]
    AlreadyInstalled { context_id: ContextId, service_id: i64 },

    /// The handler's init step failed.
    #[error("handler `{name}` failed to initialize: {source}")]
    Init {
        name: String,
        #[source]
        source: ServletError,
    },
}

/// Storage for dispatchable handlers.
pub trait HandlerRegistry: Send + Sync {
    /// Install a filter.
    fn add_filter(&self, descriptor: Arc<FilterDescriptor>) -> Result<(), HandlerError>;

    /// Install a servlet.
    fn add_servlet(&self, descriptor: Arc<ServletDescriptor>) -> Result<(), HandlerError>;

    /// Uninstall a servlet; `destroy` runs its teardown.
    fn remove_servlet(&self, context_id: ContextId, info: &ServletInfo, destroy: bool);

    /// Uninstall a filter; `destroy` runs its teardown.
    fn remove_filter(&self, context_id: ContextId, info: &FilterInfo, destroy: bool);
}
