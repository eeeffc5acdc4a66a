//! Routing error types.
//!
//! # Design Decisions
//! - Registration failures (`RouteError`) are configuration errors: callers
//!   propagate them and never start serving with a half-built router
//! - Request-time failures (`DispatchError`) never escape `serve`; they are
//!   handed to the router's error callback along with their status code

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while registering a route.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Path patterns must be non-empty and start with `/`.
    #[error("invalid route pattern {0:?}: must start with '/'")]
    InvalidPattern(String),

    /// A `<name:regex>` fragment did not compile.
    #[error("invalid regular expression in pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A literal pattern is already served by an earlier route.
    #[error("pattern {pattern:?} matches route {existing:?}")]
    Ambiguous { pattern: String, existing: String },
}

/// Errors raised by the percent decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated percent escape at byte {0}")]
    TruncatedEscape(usize),

    #[error("invalid hex digit in percent escape at byte {0}")]
    InvalidHexDigit(usize),
}

/// Request-time dispatch failures surfaced through the error callback.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("no route matches {0:?}")]
    NotFound(String),

    #[error("method {method} not allowed for {path:?}")]
    MethodNotAllowed { method: String, path: String },

    #[error("malformed value for parameter {name:?}: {source}")]
    BadParam {
        name: String,
        #[source]
        source: DecodeError,
    },
}

impl DispatchError {
    /// HTTP status code reported for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NotFound(_) => StatusCode::NOT_FOUND,
            DispatchError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::BadParam { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            DispatchError::NotFound(_) => "not_found",
            DispatchError::MethodNotAllowed { .. } => "method_not_allowed",
            DispatchError::BadParam { .. } => "bad_request",
        }
    }
}
