//! Request handlers and the router error callback.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use crate::http::error::HttpError;
use crate::routing::error::DispatchError;
use crate::routing::params::Params;

/// Future returned by a handler.
pub type HandlerFuture = BoxFuture<'static, Response>;

/// Something that can answer a dispatched request.
///
/// Implemented for any `Fn(Request<Body>, Params) -> impl Future` whose
/// output converts into a response, and for [`Nested`] routers.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, req: Request<Body>, params: Params) -> HandlerFuture;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request<Body>, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn handle(&self, req: Request<Body>, params: Params) -> HandlerFuture {
        let fut = (self)(req, params);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Shared, type-erased handler.
pub type BoxHandler = Arc<dyn Handler>;

/// A router mounted as the handler of an outer route.
///
/// Parameters matched by the outer router are merged under the ones the
/// inner router matches.
pub struct Nested<R>(pub(crate) Arc<R>);

impl<R> Nested<R> {
    pub fn new(router: Arc<R>) -> Self {
        Self(router)
    }
}

impl<R> Clone for Nested<R> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Callback producing 404, 405 and 400 responses.
pub type ErrorFn =
    Arc<dyn Fn(&Request<Body>, StatusCode, Option<&DispatchError>) -> Response + Send + Sync>;

/// Default error callback: the status code's reason phrase as plain text,
/// with the dispatch failure kept as the (unexposed) cause.
pub fn default_error(_req: &Request<Body>, status: StatusCode, err: Option<&DispatchError>) -> Response {
    let mut error = HttpError::status(status);
    if let Some(err) = err {
        error = error.with_source(err.clone());
    }
    error.into_response()
}

/// Permanent redirect to `location`.
pub(crate) fn redirect(location: &str) -> Response {
    let mut response = StatusCode::MOVED_PERMANENTLY.into_response();
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(header::LOCATION, value);
        }
        Err(e) => tracing::warn!(location = %location, error = %e, "Unrepresentable redirect location"),
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closure_handler() {
        let handler = |_req: Request<Body>, params: Params| async move {
            format!("hello {}", params.get("name").unwrap_or("?"))
        };
        let params: Params = [("name", "ann")].into_iter().collect();
        let response = handler.handle(Request::new(Body::empty()), params).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"hello ann");
    }

    #[tokio::test]
    async fn test_default_error_body() {
        let response = default_error(&Request::new(Body::empty()), StatusCode::NOT_FOUND, None);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Not Found\n");
    }

    #[test]
    fn test_redirect_sets_location() {
        let response = redirect("/d/?q=1");
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/d/?q=1");
    }

    #[tokio::test]
    async fn test_http_error_handler() {
        let handler = |_req: Request<Body>, params: Params| async move {
            match params.get("id") {
                Some(id) => Ok(format!("item {}", id)),
                None => Err(HttpError::forbidden()),
            }
        };
        let response = handler.handle(Request::new(Body::empty()), Params::new()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Forbidden\n");
    }

    #[tokio::test]
    async fn test_default_error_hides_cause() {
        let err = DispatchError::NotFound("/secret".to_string());
        let response = default_error(&Request::new(Body::empty()), err.status(), Some(&err));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Not Found\n");
    }
}
