//! Producer-facing registration surface.
//!
//! # Data Flow
//! ```text
//! Producer (startup config, embedding application)
//!     → http_service.rs (validate alias, allocate service id, build ServletInfo)
//!     → registry::AliasRegistry (uniqueness, install)
//!
//! Producer shutdown
//!     → http_service.rs unregister_all (identity removal of everything it registered)
//! ```
//!
//! # Design Decisions
//! - Alias syntax is checked here, before the registry lock is taken
//! - Service ids are negative so they never collide with declarative ids
//! - Each producer tracks its own registrations for bulk cleanup

pub mod http_service;
pub mod static_servlet;

pub use http_service::{is_alias_valid, HttpService};
pub use static_servlet::StaticServlet;
