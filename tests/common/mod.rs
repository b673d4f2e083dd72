//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use http_dispatcher::{HttpServer, ServerConfig};

/// Config bound to an ephemeral loopback port, without signal handling.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1".into();
    config.listener.port = 0;
    config.lifecycle.handle_signals = false;
    config
}

/// Start `server` and return it with its bound address.
pub async fn start(server: HttpServer) -> (Arc<HttpServer>, SocketAddr) {
    let server = Arc::new(server);
    let addr = server.start().await.unwrap();
    (server, addr)
}

/// A client that does not reuse connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
