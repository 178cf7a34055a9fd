//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router whose fallback dispatches to registered servlets
//! - Wire up middleware (request id, tracing, timeout)
//! - Bind server to listener
//! - Stop accepting and drain on the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::handler::RankedHandlerRegistry;
use crate::http::dispatch::dispatch_handler;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub handlers: Arc<RankedHandlerRegistry>,
    pub max_body_bytes: usize,
}

/// HTTP server dispatching to the handler registry.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig, handlers: Arc<RankedHandlerRegistry>) -> Self {
        let state = AppState {
            handlers,
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Filter, FilterOutcome, ServletContext};
    use crate::registry::AliasRegistry;
    use crate::service::{HttpService, StaticServlet};
    use axum::body::{Body, Bytes};
    use axum::http::{Request, Response, StatusCode};
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    struct Block;

    impl Filter for Block {
        fn do_filter(&self, request: &Request<Bytes>) -> FilterOutcome {
            if request.headers().contains_key("x-block") {
                let mut response = Response::new(Body::from("blocked"));
                *response.status_mut() = StatusCode::FORBIDDEN;
                FilterOutcome::Respond(response)
            } else {
                FilterOutcome::Continue
            }
        }
    }

    fn setup(config: ServiceConfig) -> (HttpService, HttpServer) {
        let handlers = Arc::new(RankedHandlerRegistry::new());
        let registry = Arc::new(AliasRegistry::new(handlers.clone()));
        let service = HttpService::new(registry, Arc::new(ServletContext::new("test")));
        (service, HttpServer::new(config, handlers))
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_dispatches_to_registered_servlet() {
        let (service, server) = setup(ServiceConfig::default());
        service
            .register_servlet(
                "/hello",
                Arc::new(StaticServlet::new(200, "text/plain", "hi").unwrap()),
                None,
                BTreeMap::new(),
            )
            .unwrap();

        let response = server
            .router()
            .oneshot(Request::get("/hello/world").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_text(response).await, "hi");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (_service, server) = setup(ServiceConfig::default());

        let response = server
            .router()
            .oneshot(Request::get("/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_client_request_id_is_kept() {
        let (_service, server) = setup(ServiceConfig::default());

        let response = server
            .router()
            .oneshot(
                Request::get("/")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get("x-request-id").unwrap(), "abc-123");
    }

    #[tokio::test]
    async fn test_filter_short_circuits() {
        let (service, server) = setup(ServiceConfig::default());
        service
            .register_servlet(
                "/",
                Arc::new(StaticServlet::new(200, "text/plain", "root").unwrap()),
                None,
                BTreeMap::new(),
            )
            .unwrap();
        service.register_filter("/", Arc::new(Block), None, 0).unwrap();

        let blocked = server
            .router()
            .oneshot(
                Request::get("/x")
                    .header("x-block", "1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(blocked.status(), StatusCode::FORBIDDEN);

        let passed = server
            .router()
            .oneshot(Request::get("/x").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_text(passed).await, "root");
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mut config = ServiceConfig::default();
        config.limits.max_body_bytes = 4;
        let (service, server) = setup(config);
        service
            .register_servlet(
                "/upload",
                Arc::new(StaticServlet::new(200, "text/plain", "ok").unwrap()),
                None,
                BTreeMap::new(),
            )
            .unwrap();

        let response = server
            .router()
            .oneshot(
                Request::post("/upload")
                    .body(Body::from("way too long"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_unregistered_alias_stops_dispatching() {
        let (service, server) = setup(ServiceConfig::default());
        service
            .register_servlet(
                "/gone",
                Arc::new(StaticServlet::new(200, "text/plain", "here").unwrap()),
                None,
                BTreeMap::new(),
            )
            .unwrap();
        service.unregister("/gone").unwrap();

        let response = server
            .router()
            .oneshot(Request::get("/gone").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
