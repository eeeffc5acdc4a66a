//! Host router.
//!
//! Dispatches on the `Host` header instead of the path. A host router holds
//! (pattern, handler) pairs; the default parameter expression is `[^.]+`.
//! The port is stripped and the host lowercased before matching. Literal
//! hosts win over patterns, patterns are tried in registration order.
//!
//! Host labels are not percent-encoded, so captured values are passed to
//! the handler as matched.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;

use crate::observability::metrics;
use crate::routing::error::{DispatchError, RouteError};
use crate::routing::handler::{default_error, BoxHandler, ErrorFn, Handler, HandlerFuture, Nested};
use crate::routing::params::Params;
use crate::routing::pattern::compile;
use crate::routing::table::RouteTable;

struct HostRoute {
    handler: BoxHandler,
}

impl std::fmt::Debug for HostRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostRoute").finish_non_exhaustive()
    }
}

/// A host route selected for a request.
pub struct HostMatch<'a> {
    pub handler: &'a BoxHandler,
    pub pattern: &'a str,
    pub params: Params,
}

/// Host-header based request router.
pub struct HostRouter {
    table: RouteTable<HostRoute>,
    error_fn: ErrorFn,
}

impl Default for HostRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRouter {
    pub fn new() -> Self {
        Self {
            table: RouteTable::new(),
            error_fn: Arc::new(default_error),
        }
    }

    /// Add a handler for the given host pattern.
    pub fn add(&mut self, pattern: &str, handler: impl Handler) -> Result<(), RouteError> {
        let compiled = compile(pattern, '.', false)?;
        tracing::debug!(pattern = %pattern, compiled = %compiled.as_str(), "Adding host route");
        self.table.insert(
            pattern,
            compiled,
            HostRoute {
                handler: Arc::new(handler),
            },
        )?;
        Ok(())
    }

    /// Set the function used to generate error responses.
    pub fn error_fn<F>(&mut self, errfn: F)
    where
        F: Fn(&Request<Body>, StatusCode, Option<&DispatchError>) -> Response + Send + Sync + 'static,
    {
        self.error_fn = Arc::new(errfn);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Resolve a raw `Host` header value.
    pub fn resolve(&self, host: &str) -> Result<HostMatch<'_>, DispatchError> {
        let host = strip_port(host).to_lowercase();
        let matched = self
            .table
            .lookup(&host)
            .ok_or_else(|| DispatchError::NotFound(host.clone()))?;
        let params = matched.captures.iter().copied().collect();
        Ok(HostMatch {
            handler: &matched.route.handler,
            pattern: matched.pattern,
            params,
        })
    }

    /// Dispatch the request to the handler registered for its host.
    pub async fn serve(&self, req: Request<Body>) -> Response {
        self.serve_with(req, Params::new()).await
    }

    pub(crate) async fn serve_with(&self, req: Request<Body>, outer: Params) -> Response {
        let host = request_host(&req).unwrap_or_default();
        match self.resolve(&host) {
            Ok(HostMatch {
                handler,
                pattern,
                params,
            }) => {
                tracing::debug!(host = %host, pattern = %pattern, params = ?params, "Dispatching by host");
                metrics::record_dispatch("host", "dispatched");
                handler.handle(req, outer.merge(params)).await
            }
            Err(err) => {
                tracing::debug!(host = %host, error = %err, "No host route");
                metrics::record_dispatch("host", err.outcome());
                (self.error_fn)(&req, err.status(), Some(&err))
            }
        }
    }

    /// Mount this router as the handler of an outer route.
    pub fn into_handler(self) -> Nested<HostRouter> {
        Nested::new(Arc::new(self))
    }
}

impl Handler for Nested<HostRouter> {
    fn handle(&self, req: Request<Body>, params: Params) -> HandlerFuture {
        let router = self.0.clone();
        Box::pin(async move { router.serve_with(req, params).await })
    }
}

/// Host named by the request: the `Host` header, else the URI authority.
fn request_host(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.as_str().to_string()))
}

/// Remove the port from a `host:port` address.
///
/// Bracketed IPv6 literals lose their brackets along with the port. Values
/// that are not a valid `host:port` pair are returned unchanged.
pub fn strip_port(s: &str) -> &str {
    if let Some(rest) = s.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) if rest[end + 1..].starts_with(':') && !rest[end + 2..].contains(':') => &rest[..end],
            _ => s,
        };
    }
    match s.rfind(':') {
        Some(i) if !s[..i].contains(':') && !s[..i].contains('[') && !s[..i].contains(']') => &s[..i],
        _ => s,
    }
}
