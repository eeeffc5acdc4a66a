//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     pattern
//!     → pattern.rs (literal string or anchored regex)
//!     → table.rs (literal map / ordered regex list, ambiguity check)
//!     → path.rs Route (method → handler) or host.rs HostRoute
//!
//! Incoming request:
//!     → host.rs (Host header, port stripped, lowercased)
//!     → path.rs (clean, redirect, lookup, method fallback)
//!     → decode.rs (percent-decode captured values)
//!     → handler(request, Params)
//! ```
//!
//! # Design Decisions
//! - Routes are registered before serving starts and never change after
//! - Literal patterns are looked up before any regex route
//! - Regex routes are tried in registration order, first match wins
//! - Parameters are an explicit argument to the handler, not request state

pub mod decode;
pub mod error;
pub mod handler;
pub mod host;
pub mod params;
pub mod path;
pub mod pattern;
pub mod table;

pub use error::{DecodeError, DispatchError, RouteError};
pub use handler::{BoxHandler, ErrorFn, Handler, Nested};
pub use host::{strip_port, HostMatch, HostRouter};
pub use params::Params;
pub use path::{Resolution, Route, Router};
