//! Alias registry and dynamic servlet dispatch.
//!
//! Producers register servlets under unique path aliases (and filters by
//! pattern) while requests are dispatched against whatever is installed at
//! that moment.
//!
//! ```text
//!     Producer ──▶ service::HttpService ──▶ registry::AliasRegistry ──▶ handler::HandlerRegistry
//!                  (alias syntax, ids)      (uniqueness, lock-step)     (ranked, dispatch-ready)
//!                                                                              │
//!     Client ──▶ http::HttpServer ──▶ http::dispatch ◀─────────────────────────┘
//! ```

pub mod admin;
pub mod config;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod service;

pub use config::ServiceConfig;
pub use handler::{HandlerRegistry, RankedHandlerRegistry, Servlet, ServletContext};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::{AliasRegistry, RegistryError};
pub use service::HttpService;
