//! Fixed-response servlet used for config-declared aliases.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Request, Response, StatusCode};

use crate::config::ServletConfig;
use crate::handler::{Servlet, ServletError};

/// Answers every request with the same status, content type and body.
#[derive(Debug, Clone)]
pub struct StaticServlet {
    status: StatusCode,
    content_type: HeaderValue,
    body: Bytes,
}

impl StaticServlet {
    pub fn new(
        status: u16,
        content_type: &str,
        body: impl Into<Bytes>,
    ) -> Result<Self, ServletError> {
        let status = StatusCode::from_u16(status)
            .map_err(|e| ServletError::Init(format!("status {}: {}", status, e)))?;
        let content_type = HeaderValue::from_str(content_type)
            .map_err(|e| ServletError::Init(format!("content type: {}", e)))?;

        Ok(Self {
            status,
            content_type,
            body: body.into(),
        })
    }

    pub fn from_config(config: &ServletConfig) -> Result<Self, ServletError> {
        Self::new(config.status, &config.content_type, config.body.clone())
    }
}

impl Servlet for StaticServlet {
    fn service(&self, _request: &Request<Bytes>) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, self.content_type.clone());
        response
    }
}
