//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and addresses
//! - Check route names, patterns and method tokens
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pattern compilation and ambiguity checks are left to the router itself
//!   at startup, which reports them as `ConfigError::Route`

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::routing::path::ANY_METHOD;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("{kind} #{index} has an empty name")]
    EmptyName { kind: &'static str, index: usize },

    #[error("duplicate {kind} name {name:?}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("route {name:?}: pattern {pattern:?} must start with '/'")]
    RelativePattern { name: String, pattern: String },

    #[error("host {name:?}: empty pattern")]
    EmptyHostPattern { name: String },

    #[error("route {name:?}: no methods")]
    NoMethods { name: String },

    #[error("route {name:?}: invalid method {method:?}")]
    InvalidMethod { name: String, method: String },
}

/// Check `config` and collect every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let mut names = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.name.is_empty() {
            errors.push(ValidationError::EmptyName { kind: "route", index });
        } else if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                kind: "route",
                name: route.name.clone(),
            });
        }
        if !route.pattern.starts_with('/') {
            errors.push(ValidationError::RelativePattern {
                name: route.name.clone(),
                pattern: route.pattern.clone(),
            });
        }
        if route.methods.is_empty() {
            errors.push(ValidationError::NoMethods {
                name: route.name.clone(),
            });
        }
        for method in &route.methods {
            if method != ANY_METHOD && Method::from_bytes(method.as_bytes()).is_err() {
                errors.push(ValidationError::InvalidMethod {
                    name: route.name.clone(),
                    method: method.clone(),
                });
            }
        }
    }

    let mut names = HashSet::new();
    for (index, host) in config.hosts.iter().enumerate() {
        if host.name.is_empty() {
            errors.push(ValidationError::EmptyName { kind: "host", index });
        } else if !names.insert(host.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                kind: "host",
                name: host.name.clone(),
            });
        }
        if host.pattern.is_empty() {
            errors.push(ValidationError::EmptyHostPattern {
                name: host.name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
