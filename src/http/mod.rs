//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, middleware)
//!     → request.rs (request ID)
//!     → service.rs (tower adapter)
//!     → routing (host router → path router → handler)
//!     → echo.rs / application handlers, error.rs for failures
//!     → Send to client
//! ```

pub mod echo;
pub mod error;
pub mod request;
pub mod server;
pub mod service;

pub use error::HttpError;
pub use request::{request_id, UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
pub use service::DispatchService;
