//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the path and host routers from validated configuration
//! - Surface pattern and ambiguity errors before any listener is bound
//!
//! # Design Decisions
//! - Fail fast: any registration error is fatal
//! - All routes are registered before the routers are shared, so serving
//!   never observes a partially built table

use std::sync::Arc;

use crate::config::{ConfigError, ServerConfig};
use crate::http::echo::echo;
use crate::routing::{BoxHandler, HostRouter, Nested, Router};

/// Routers built from a configuration.
pub struct Routers {
    /// Path routes, shared by every host route.
    pub path: Arc<Router>,
    /// Host routes, when any are configured.
    pub hosts: Option<HostRouter>,
}

impl Routers {
    /// Outermost handler: the host router if configured, else the path
    /// router.
    pub fn into_handler(self) -> BoxHandler {
        match self.hosts {
            Some(hosts) => Arc::new(hosts.into_handler()),
            None => Arc::new(Nested::new(self.path)),
        }
    }
}

/// Register every configured route.
pub fn build_routers(config: &ServerConfig) -> Result<Routers, ConfigError> {
    let mut router = Router::new();
    if config.router.use_url_path {
        router.use_url_path();
    }

    for route in &config.routes {
        let registered = router.add(&route.pattern)?;
        for method in &route.methods {
            registered.method(method.clone(), echo(route.name.clone()));
        }
        tracing::info!(
            name = %route.name,
            pattern = %route.pattern,
            methods = ?route.methods,
            "Route registered"
        );
    }
    let path = Arc::new(router);

    let hosts = if config.hosts.is_empty() {
        None
    } else {
        let mut hosts = HostRouter::new();
        for host in &config.hosts {
            hosts.add(&host.pattern, Nested::new(path.clone()))?;
            tracing::info!(name = %host.name, pattern = %host.pattern, "Host route registered");
        }
        Some(hosts)
    };

    Ok(Routers { path, hosts })
}
