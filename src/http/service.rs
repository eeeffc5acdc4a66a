//! Tower adapter for the routers.
//!
//! Lets a path or host router sit behind any `tower::Service` based server,
//! here the axum fallback service.

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;
use tower::Service;

use crate::routing::{BoxHandler, Handler, Params};

/// `tower::Service` dispatching every request to one handler, usually a
/// [`crate::routing::Nested`] router.
#[derive(Clone)]
pub struct DispatchService {
    handler: BoxHandler,
}

impl DispatchService {
    pub fn new(handler: impl Handler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    pub fn from_shared(handler: BoxHandler) -> Self {
        Self { handler }
    }
}

impl Service<Request<Body>> for DispatchService {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let fut = self.handler.handle(req, Params::new());
        Box::pin(async move { Ok(fut.await) })
    }
}
