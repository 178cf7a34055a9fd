//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alias_dispatch::admin::{self, AdminState};
use alias_dispatch::handler::{Servlet, ServletContext, ServletError, ServletInfo};
use alias_dispatch::{AliasRegistry, HttpServer, RankedHandlerRegistry, ServiceConfig, Shutdown};
use axum::body::{Body, Bytes};
use axum::http::{Request, Response};
use tokio::net::TcpListener;

/// Servlet answering with a fixed body and counting lifecycle calls.
#[derive(Default)]
pub struct RecordingServlet {
    pub body: &'static str,
    pub inits: AtomicUsize,
    pub destroys: AtomicUsize,
    pub requests: AtomicUsize,
}

impl RecordingServlet {
    pub fn new(body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            body,
            ..Default::default()
        })
    }

    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }
}

impl Servlet for RecordingServlet {
    fn init(&self, _context: &ServletContext) -> Result<(), ServletError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn service(&self, _request: &Request<Bytes>) -> Response<Body> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Response::new(Body::from(self.body))
    }

    fn destroy(&self) {
        self.destroys.fetch_add(1, Ordering::SeqCst);
    }
}

/// Servlet whose init always fails.
pub struct FailingServlet;

impl Servlet for FailingServlet {
    fn init(&self, _context: &ServletContext) -> Result<(), ServletError> {
        Err(ServletError::MissingParam("endpoint".into()))
    }

    fn service(&self, _request: &Request<Bytes>) -> Response<Body> {
        Response::new(Body::empty())
    }
}

pub fn context() -> Arc<ServletContext> {
    Arc::new(ServletContext::new("test"))
}

pub fn info(id: i64, alias: &str) -> ServletInfo {
    ServletInfo::new(id, alias, alias)
}

/// Fresh handler registry and alias registry wired together.
pub fn registries() -> (Arc<RankedHandlerRegistry>, Arc<AliasRegistry>) {
    let handlers = Arc::new(RankedHandlerRegistry::new());
    let registry = Arc::new(AliasRegistry::new(handlers.clone()));
    (handlers, registry)
}

/// A dispatch server and admin API running on ephemeral ports.
pub struct TestService {
    pub http_addr: SocketAddr,
    pub admin_addr: SocketAddr,
    pub handlers: Arc<RankedHandlerRegistry>,
    pub registry: Arc<AliasRegistry>,
    pub shutdown: Shutdown,
}

pub const ADMIN_KEY: &str = "test-admin-key";

pub async fn start_service() -> TestService {
    let (handlers, registry) = registries();
    let shutdown = Shutdown::new();

    let http_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let http_addr = http_listener.local_addr().unwrap();
    let server = HttpServer::new(ServiceConfig::default(), handlers.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(http_listener, server_shutdown).await;
    });

    let admin_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let admin_addr = admin_listener.local_addr().unwrap();
    let state = AdminState::new(registry.clone(), ADMIN_KEY);
    let admin_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = admin::serve(admin_listener, state, admin_shutdown).await;
    });

    TestService {
        http_addr,
        admin_addr,
        handlers,
        registry,
        shutdown,
    }
}
