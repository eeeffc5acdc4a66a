//! Path router.
//!
//! A router holds a list of routes. A route is a request path pattern (see
//! [`crate::routing::pattern`]) and a collection of (method, handler) pairs.
//! Patterns must begin with `/`; the default parameter expression is
//! `[^/]+`.
//!
//! # Dispatch
//! ```text
//! request-target
//!     → split path / query at the first '?'
//!     → clean path; differs from original     → 301 to cleaned path
//!     → literal map, then regex routes        → none: 404
//!     → pattern ends in '/', path does not    → 301 to path + '/'
//!     → method, GET for HEAD, '*'             → none: 405
//!     → percent-decode named captures         → malformed: 400
//!     → handler(request, params)
//! ```
//!
//! Routes must all be added before the router starts serving. After that
//! the router is read-only and can be shared between tasks without locks.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;

use crate::observability::metrics;
use crate::routing::decode::{clean_path, percent_decode};
use crate::routing::error::{DispatchError, RouteError};
use crate::routing::handler::{
    default_error, redirect, BoxHandler, ErrorFn, Handler, HandlerFuture, Nested,
};
use crate::routing::params::Params;
use crate::routing::pattern::compile;
use crate::routing::table::RouteTable;

/// Method key matching every request method.
pub const ANY_METHOD: &str = "*";

/// A path pattern and its method handlers.
pub struct Route {
    add_slash: bool,
    handlers: HashMap<String, BoxHandler>,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut methods: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("Route")
            .field("add_slash", &self.add_slash)
            .field("methods", &methods)
            .finish()
    }
}

impl Route {
    fn new(add_slash: bool) -> Self {
        Self {
            add_slash,
            handlers: HashMap::new(),
        }
    }

    /// Set the handler for `method`. Use `"*"` to match all methods.
    ///
    /// Setting the same method twice replaces the earlier handler.
    pub fn method(&mut self, method: impl Into<String>, handler: impl Handler) -> &mut Self {
        self.handlers.insert(method.into(), Arc::new(handler));
        self
    }

    pub fn get(&mut self, handler: impl Handler) -> &mut Self {
        self.method("GET", handler)
    }

    pub fn post(&mut self, handler: impl Handler) -> &mut Self {
        self.method("POST", handler)
    }

    pub fn put(&mut self, handler: impl Handler) -> &mut Self {
        self.method("PUT", handler)
    }

    pub fn delete(&mut self, handler: impl Handler) -> &mut Self {
        self.method("DELETE", handler)
    }

    /// Handler for every method without a more specific one.
    pub fn any(&mut self, handler: impl Handler) -> &mut Self {
        self.method(ANY_METHOD, handler)
    }

    /// Exact method, then GET for HEAD, then `*`.
    fn handler_for(&self, method: &str) -> Option<&BoxHandler> {
        self.handlers
            .get(method)
            .or_else(|| {
                if method == "HEAD" {
                    self.handlers.get("GET")
                } else {
                    None
                }
            })
            .or_else(|| self.handlers.get(ANY_METHOD))
    }
}

/// Outcome of resolving a request against the route table.
pub enum Resolution<'a> {
    /// Answer with a permanent redirect to this location.
    Redirect(String),
    /// Hand the failure to the error callback.
    Error(DispatchError),
    /// Invoke `handler` with `params`.
    Dispatch {
        handler: &'a BoxHandler,
        pattern: &'a str,
        params: Params,
    },
}

impl std::fmt::Debug for Resolution<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Redirect(location) => f.debug_tuple("Redirect").field(location).finish(),
            Resolution::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Resolution::Dispatch { pattern, params, .. } => f
                .debug_struct("Dispatch")
                .field("pattern", pattern)
                .field("params", params)
                .finish(),
        }
    }
}

/// Path-based request router.
pub struct Router {
    table: RouteTable<Route>,
    error_fn: ErrorFn,
    use_url_path: bool,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            table: RouteTable::new(),
            error_fn: Arc::new(default_error),
            use_url_path: false,
        }
    }

    /// Add a route for `pattern` and return it for method registration.
    ///
    /// A pattern ending in `/` also serves the path without the slash by
    /// redirecting to it.
    pub fn add(&mut self, pattern: &str) -> Result<&mut Route, RouteError> {
        if !pattern.starts_with('/') {
            return Err(RouteError::InvalidPattern(pattern.to_string()));
        }
        let add_slash = pattern != "/" && pattern.ends_with('/');
        let compiled = compile(pattern, '/', add_slash)?;
        let literal = compiled.is_literal();

        tracing::debug!(pattern = %pattern, compiled = %compiled.as_str(), "Adding route");

        let index = self.table.insert(pattern, compiled, Route::new(add_slash))?;
        if literal && add_slash {
            self.table.insert_alias(&pattern[..pattern.len() - 1], index);
        }

        self.table
            .get_mut(index)
            .ok_or_else(|| RouteError::InvalidPattern(pattern.to_string()))
    }

    /// Route on the already-decoded URL path instead of the raw request
    /// target.
    ///
    /// Use this when the router is mounted below another routing layer that
    /// has normalized the path. Cleaning redirects and parameter decoding
    /// are skipped.
    pub fn use_url_path(&mut self) {
        self.use_url_path = true;
    }

    /// Set the function used to generate error responses.
    pub fn error_fn<F>(&mut self, errfn: F)
    where
        F: Fn(&Request<Body>, StatusCode, Option<&DispatchError>) -> Response + Send + Sync + 'static,
    {
        self.error_fn = Arc::new(errfn);
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Resolve a raw request target (path plus optional query).
    pub fn resolve(&self, target: &str, method: &str) -> Resolution<'_> {
        let (path, query) = split_target(target);

        let clean = if path.is_empty() || path == "/" {
            "/".to_string()
        } else {
            let mut clean = clean_path(path);
            if path.ends_with('/') && !clean.ends_with('/') {
                clean.push('/');
            }
            clean
        };
        if path != clean {
            return Resolution::Redirect(clean + query);
        }

        self.resolve_path(path, query, method, true)
    }

    /// Resolve a raw request target the way `serve` does.
    ///
    /// Without `use_url_path` this is [`Router::resolve`]. With it, the path
    /// is percent-decoded once as a whole and resolved with
    /// [`Router::resolve_url_path`]; a slash redirect then points at the
    /// still-encoded path so the `Location` stays a valid header value.
    pub fn resolve_target(&self, target: &str, method: &str) -> Resolution<'_> {
        if !self.use_url_path {
            return self.resolve(target, method);
        }

        let (raw, query) = split_target(target);
        let path = match percent_decode(raw) {
            Ok(path) => path,
            Err(source) => {
                return Resolution::Error(DispatchError::BadParam {
                    name: "path".to_string(),
                    source,
                })
            }
        };
        match self.resolve_url_path(&path, query, method) {
            Resolution::Redirect(_) => Resolution::Redirect(format!("{}/{}", raw, query)),
            other => other,
        }
    }

    /// Resolve an already-parsed, already-decoded path.
    pub fn resolve_url_path(&self, path: &str, query: &str, method: &str) -> Resolution<'_> {
        self.resolve_path(path, query, method, false)
    }

    fn resolve_path(&self, path: &str, query: &str, method: &str, decode: bool) -> Resolution<'_> {
        let Some(matched) = self.table.lookup(path) else {
            return Resolution::Error(DispatchError::NotFound(path.to_string()));
        };

        let route = matched.route;
        if route.add_slash && !path.ends_with('/') {
            return Resolution::Redirect(format!("{}/{}", path, query));
        }

        let Some(handler) = route.handler_for(method) else {
            return Resolution::Error(DispatchError::MethodNotAllowed {
                method: method.to_string(),
                path: path.to_string(),
            });
        };

        let mut params = Params::new();
        for (name, value) in matched.captures {
            if !decode {
                params.insert(name, value);
                continue;
            }
            match percent_decode(value) {
                Ok(decoded) => params.insert(name, decoded),
                Err(source) => {
                    return Resolution::Error(DispatchError::BadParam {
                        name: name.to_string(),
                        source,
                    })
                }
            }
        }

        Resolution::Dispatch {
            handler,
            pattern: matched.pattern,
            params,
        }
    }

    /// Dispatch the request to a registered handler.
    pub async fn serve(&self, req: Request<Body>) -> Response {
        self.serve_with(req, Params::new()).await
    }

    pub(crate) async fn serve_with(&self, req: Request<Body>, outer: Params) -> Response {
        let method = req.method().as_str().to_string();
        let target = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let resolution = self.resolve_target(target, &method);

        match resolution {
            Resolution::Redirect(location) => {
                tracing::debug!(method = %method, location = %location, "Redirecting");
                metrics::record_dispatch("path", "redirect");
                redirect(&location)
            }
            Resolution::Error(err) => {
                match &err {
                    DispatchError::BadParam { .. } => {
                        tracing::warn!(method = %method, uri = %req.uri(), error = %err, "Rejecting request")
                    }
                    _ => tracing::debug!(method = %method, uri = %req.uri(), error = %err, "No handler"),
                }
                metrics::record_dispatch("path", err.outcome());
                (self.error_fn)(&req, err.status(), Some(&err))
            }
            Resolution::Dispatch {
                handler,
                pattern,
                params,
            } => {
                tracing::debug!(method = %method, pattern = %pattern, params = ?params, "Dispatching");
                metrics::record_dispatch("path", "dispatched");
                handler.handle(req, outer.merge(params)).await
            }
        }
    }

    /// Mount this router as the handler of an outer route.
    pub fn into_handler(self) -> Nested<Router> {
        Nested::new(Arc::new(self))
    }
}

impl Handler for Nested<Router> {
    fn handle(&self, req: Request<Body>, params: Params) -> HandlerFuture {
        let router = self.0.clone();
        Box::pin(async move { router.serve_with(req, params).await })
    }
}

/// Split a request target at the first `?`; the query keeps its `?`.
fn split_target(target: &str) -> (&str, &str) {
    match target.find('?') {
        Some(i) => target.split_at(i),
        None => (target, ""),
    }
}
