//! Handler-facing HTTP errors.
//!
//! Handlers may return `Result<T, HttpError>`; the error renders as its
//! status code and user-visible message, one line of plain text with
//! `X-Content-Type-Options: nosniff`. The routers' default error callback
//! renders through it too.

use std::error::Error as StdError;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync>;

/// An HTTP status with a user-visible message and an optional cause.
#[derive(Debug, Error)]
#[error("status {}{}", .status.as_u16(), reason_suffix(.source))]
pub struct HttpError {
    /// HTTP status code.
    pub status: StatusCode,
    /// User visible error message.
    pub message: String,
    /// Optional reason for the HTTP error, never shown to the client.
    #[source]
    pub source: Option<BoxError>,
}

fn reason_suffix(source: &Option<BoxError>) -> String {
    match source {
        Some(e) => format!(", reason {}", e),
        None => String::new(),
    }
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Error").to_string()
}

impl HttpError {
    /// An error with the status code's standard reason as message.
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            message: reason(status),
            source: None,
        }
    }

    pub fn bad_request() -> Self {
        Self::status(StatusCode::BAD_REQUEST)
    }

    pub fn forbidden() -> Self {
        Self::status(StatusCode::FORBIDDEN)
    }

    pub fn method_not_allowed() -> Self {
        Self::status(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn not_found() -> Self {
        Self::status(StatusCode::NOT_FOUND)
    }

    /// Attach a cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Convert any error into an `HttpError`.
    ///
    /// An `HttpError` passes through, gaining its status reason as message
    /// if it had none. Anything else becomes a 500 with the original error
    /// kept as the cause.
    pub fn convert(err: impl Into<BoxError>) -> Self {
        match err.into().downcast::<HttpError>() {
            Ok(e) if !e.message.is_empty() => *e,
            Ok(e) => {
                let HttpError { status, source, .. } = *e;
                Self {
                    status,
                    message: reason(status),
                    source,
                }
            }
            Err(other) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: reason(StatusCode::INTERNAL_SERVER_ERROR),
                source: Some(other),
            },
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self, "Handler failed");
        }
        let mut response = (self.status, format!("{}\n", self.message)).into_response();
        response.headers_mut().insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
        response
    }
}
