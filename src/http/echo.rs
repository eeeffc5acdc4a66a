//! Echo handler used for configured routes.
//!
//! Answers with the route name, request method and matched parameters as
//! JSON, which is enough to exercise a routing table end to end.

use axum::body::Body;
use axum::http::Request;
use axum::Json;
use serde::Serialize;

use crate::routing::{Handler, Params};

#[derive(Debug, Serialize)]
struct EchoBody {
    route: String,
    method: String,
    path: String,
    params: Params,
}

/// Handler echoing the match for route `name`.
pub fn echo(name: impl Into<String>) -> impl Handler {
    let name = name.into();
    move |req: Request<Body>, params: Params| {
        let body = EchoBody {
            route: name.clone(),
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            params,
        };
        async move { Json(body) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_body() {
        let handler = echo("user");
        let req = Request::builder()
            .method("POST")
            .uri("/users/7?x=1")
            .body(Body::empty())
            .unwrap();
        let params: Params = [("id", "7")].into_iter().collect();

        let response = handler.handle(req, params).await;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "route": "user",
                "method": "POST",
                "path": "/users/7",
                "params": {"id": "7"},
            })
        );
    }
}
