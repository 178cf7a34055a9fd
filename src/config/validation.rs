//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, status codes valid)
//! - Detect invalid and conflicting servlet aliases
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::service::is_alias_valid;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: `{value}` is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("unknown log level `{0}`")]
    UnknownLogLevel(String),

    #[error("servlet alias `{0}` must be \"/\" or start with \"/\" and not end with \"/\"")]
    InvalidAlias(String),

    #[error("servlet alias `{0}` is declared more than once")]
    DuplicateAlias(String),

    #[error("servlet `{alias}`: {status} is not a valid status code")]
    InvalidStatus { alias: String, status: u16 },
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);
    if config.admin.enabled {
        check_address("admin.bind_address", &config.admin.bind_address, &mut errors);
    }
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("limits.max_body_bytes"));
    }

    let level = config.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for servlet in &config.servlets {
        if !is_alias_valid(&servlet.alias) {
            errors.push(ValidationError::InvalidAlias(servlet.alias.clone()));
        } else if !seen.insert(servlet.alias.as_str()) {
            errors.push(ValidationError::DuplicateAlias(servlet.alias.clone()));
        }

        if StatusCode::from_u16(servlet.status).is_err() {
            errors.push(ValidationError::InvalidStatus {
                alias: servlet.alias.clone(),
                status: servlet.status,
            });
        }
    }

    if config.admin.enabled && config.admin.api_key == "CHANGE_ME_IN_PRODUCTION" {
        tracing::warn!("Admin API enabled with the placeholder api_key");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
