//! TCP listener binding.
//!
//! # Responsibilities
//! - Resolve the configured address and port
//! - Bind the socket the server accepts on
//! - Report the actual local address (port 0 binds an ephemeral port)

use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// The configured address does not parse.
    Address(String),
    /// Failed to bind to address.
    Bind(std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Address(addr) => write!(f, "Invalid listen address: {}", addr),
            ListenerError::Bind(e) => write!(f, "Failed to bind: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// Bind to the configured address and port.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let raw = config.socket_address();
    let addr: SocketAddr = raw.parse().map_err(|_| ListenerError::Address(raw.clone()))?;

    let listener = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;
    let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

    tracing::info!(
        address = %local_addr,
        max_body_size = config.max_body_size,
        "Listener bound"
    );

    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let config = ListenerConfig {
            bind_address: "127.0.0.1".into(),
            port: 0,
            ..ListenerConfig::default()
        };
        let listener = bind(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn rejects_bad_address() {
        let config = ListenerConfig {
            bind_address: "not-an-ip".into(),
            ..ListenerConfig::default()
        };
        assert!(matches!(bind(&config).await, Err(ListenerError::Address(_))));
    }

    #[tokio::test]
    async fn port_in_use_is_bind_error() {
        let config = ListenerConfig {
            bind_address: "127.0.0.1".into(),
            port: 0,
            ..ListenerConfig::default()
        };
        let first = bind(&config).await.unwrap();
        let taken = ListenerConfig {
            port: first.local_addr().unwrap().port(),
            ..config
        };
        assert!(matches!(bind(&taken).await, Err(ListenerError::Bind(_))));
    }
}
