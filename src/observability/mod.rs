//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing, http, lifecycle
//!     → logging.rs (structured log events)
//!     → metrics.rs (dispatch outcome counters)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
