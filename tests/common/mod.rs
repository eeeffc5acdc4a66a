//! Shared utilities for integration tests.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use route_dispatch::config::{parse_config, ServerConfig};
use route_dispatch::http::HttpServer;
use route_dispatch::lifecycle::{build_routers, Shutdown};

/// Start a server for the TOML `config` on an ephemeral port.
///
/// The server runs until the returned `Shutdown` is triggered or dropped.
pub async fn start_server(config: &str) -> (SocketAddr, Shutdown) {
    let config: ServerConfig = parse_config(config).unwrap();
    let handler = build_routers(&config).unwrap().into_handler();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::from_shared(config, handler);
    tokio::spawn(server.run(listener, shutdown.subscribe()));

    (addr, shutdown)
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
