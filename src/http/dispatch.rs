//! Request dispatch against the installed handlers.
//!
//! # Responsibilities
//! - Buffer the request body up to the configured limit
//! - Run matching filters in rank order; a filter may answer directly
//! - Hand the request to the resolved servlet, or answer 404
//!
//! # Design Decisions
//! - Reads one registry snapshot per request; concurrent (un)registration
//!   never blocks or tears a request in flight
//! - Servlets run inline; they are expected to be fast and non-blocking

use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::handler::{FilterOutcome, RankedHandlerRegistry};
use crate::http::request::X_REQUEST_ID;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Route a buffered request through filters and to its servlet.
pub fn dispatch(handlers: &RankedHandlerRegistry, request: &Request<Bytes>) -> Response {
    let path = request.uri().path();

    for descriptor in handlers.filters_for(path) {
        if let FilterOutcome::Respond(response) = descriptor.filter().do_filter(request) {
            tracing::debug!(
                filter = %descriptor.info().name,
                path = %path,
                status = %response.status(),
                "Filter answered request"
            );
            return response;
        }
    }

    match handlers.resolve_servlet(path) {
        Some(descriptor) => {
            tracing::debug!(servlet = %descriptor.info().name, path = %path, "Dispatching to servlet");
            descriptor.servlet().service(request)
        }
        None => (StatusCode::NOT_FOUND, "No servlet registered for this path").into_response(),
    }
}

/// Fallback handler receiving every request.
pub async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to buffer request body");
            metrics::record_dispatch(StatusCode::PAYLOAD_TOO_LARGE.as_u16(), start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let request = Request::from_parts(parts, bytes);
    let response = dispatch(&state.handlers, &request);

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        status = %response.status(),
        "Request dispatched"
    );
    metrics::record_dispatch(response.status().as_u16(), start);
    response
}
