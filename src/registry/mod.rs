//! Alias registry subsystem.
//!
//! # Data Flow
//! ```text
//! register_servlet(alias, context, servlet, info)
//!     → [alias lock] duplicate check
//!     → build ServletDescriptor (direct context, default ranking)
//!     → HandlerRegistry::add_servlet
//!     → record alias → descriptor
//!
//! unregister(alias) / unregister_servlet(servlet) / unregister_all()
//!     → [alias lock] remove table entry
//!     → HandlerRegistry::remove_servlet(destroy)
//! ```
//!
//! # Design Decisions
//! - One mutex covers the whole check-and-mutate sequence, including the
//!   handler registry call, so the table and the installed set never diverge
//! - The alias is recorded only after the install succeeded; a failed
//!   install leaves nothing to roll back
//! - Filters pass straight through; they are not alias-keyed

pub mod alias;
pub mod error;

pub use alias::{AliasRegistry, AliasRegistryBuilder};
pub use error::RegistryError;
