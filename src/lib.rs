//! Pattern-based HTTP request routing.
//!
//! A path router and a host router that compile `<name:regexp>` patterns,
//! redirect to canonical paths, fall back from HEAD to GET and from any
//! method to `*`, and hand percent-decoded parameters to handlers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{HostRouter, Params, Router};
