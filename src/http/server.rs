//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the dispatch handler in an axum service
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::Router as AxumRouter;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::request::UuidRequestId;
use crate::http::service::DispatchService;
use crate::routing::{BoxHandler, Handler};

/// HTTP server in front of a router.
pub struct HttpServer {
    app: AxumRouter,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server answering every request with `handler`.
    pub fn new(config: ServerConfig, handler: impl Handler) -> Self {
        Self::from_shared(config, Arc::new(handler))
    }

    pub fn from_shared(config: ServerConfig, handler: BoxHandler) -> Self {
        let app = Self::build_router(&config, DispatchService::from_shared(handler));
        Self { app, config }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, service: DispatchService) -> AxumRouter {
        AxumRouter::new()
            .fallback_service(service)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
