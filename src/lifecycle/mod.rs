//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build registries → Register configured servlets → Start listeners
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → broadcast → servers drain → producer registrations released
//! ```
//!
//! # Design Decisions
//! - Fail fast: a configured servlet that cannot be registered aborts startup
//! - Listeners start last (traffic only when registrations are in place)
//! - Registrations are released after the servers stopped dispatching

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
pub use startup::{register_configured_servlets, run_with_registrations};
