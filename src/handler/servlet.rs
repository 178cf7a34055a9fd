//! Servlet and filter lifecycle contracts.
//!
//! # Lifecycle
//! ```text
//! init (on install) → service / do_filter (per request) → destroy (on destroying removal)
//! ```
//!
//! The registering producer owns the object; the handler registry only
//! calls `init` when installing and `destroy` when told to.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Request, Response};
use thiserror::Error;

use crate::handler::context::ServletContext;

/// Failure raised by a servlet or filter while initializing.
#[derive(Debug, Error)]
pub enum ServletError {
    /// The handler refused to start.
    #[error("initialization failed: {0}")]
    Init(String),

    /// A required init parameter is absent.
    #[error("missing init parameter `{0}`")]
    MissingParam(String),
}

/// A request handler installed under an alias.
pub trait Servlet: Send + Sync + 'static {
    /// Called once when the servlet is installed.
    fn init(&self, context: &ServletContext) -> Result<(), ServletError> {
        let _ = context;
        Ok(())
    }

    /// Produce the response for a buffered request.
    fn service(&self, request: &Request<Bytes>) -> Response<Body>;

    /// Called on destroying removal.
    fn destroy(&self) {}
}

/// What a filter decided for a request.
#[derive(Debug)]
pub enum FilterOutcome {
    /// Hand the request to the next filter or the servlet.
    Continue,
    /// Short-circuit with this response.
    Respond(Response<Body>),
}

/// A request interceptor running ahead of servlets.
pub trait Filter: Send + Sync + 'static {
    fn init(&self, context: &ServletContext) -> Result<(), ServletError> {
        let _ = context;
        Ok(())
    }

    fn do_filter(&self, request: &Request<Bytes>) -> FilterOutcome;

    fn destroy(&self) {}
}

/// Identity comparison of two servlet handles.
///
/// Only the data pointers are compared; the same object seen through
/// different vtables is still the same servlet.
pub fn same_servlet(a: &Arc<dyn Servlet>, b: &Arc<dyn Servlet>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}
