//! HTTP front end.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, trace, timeout layers)
//!     → dispatch.rs (buffer body, run filter chain, call servlet)
//!     → RankedHandlerRegistry snapshot (whatever is installed right now)
//!     → Send response
//! ```

pub mod dispatch;
pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
