//! Handler descriptors and the dispatch-side handler registry.
//!
//! # Data Flow
//! ```text
//! Producer hands over servlet / filter
//!     → descriptor.rs (wrap with context + info)
//!     → registry.rs (HandlerRegistry contract)
//!     → ranked.rs (install: init, rank, publish snapshot)
//!
//! Incoming request path
//!     → ranked.rs (filters_for / resolve_servlet)
//!     → servlet.rs (Filter::do_filter, Servlet::service)
//! ```
//!
//! # Design Decisions
//! - Servlet identity is `Arc` pointer identity, never value equality
//! - Installed sets are immutable snapshots; dispatch reads take no lock
//! - The destroy flag is an explicit argument on every removal

pub mod context;
pub mod descriptor;
pub mod info;
pub mod ranked;
pub mod registry;
pub mod servlet;

pub use context::{ContextId, ServletContext};
pub use descriptor::{FilterDescriptor, ServletDescriptor};
pub use info::{FilterInfo, ServletInfo};
pub use ranked::RankedHandlerRegistry;
pub use registry::{HandlerError, HandlerRegistry};
pub use servlet::{same_servlet, Filter, FilterOutcome, Servlet, ServletError};
