//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Cap on a buffered request body: 512 KiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 512 * 1024;

/// Root configuration for the dispatcher server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (address, port, body cap).
    pub listener: ListenerConfig,

    /// Start/shutdown behavior.
    pub lifecycle: LifecycleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// IP address to bind (e.g., "0.0.0.0").
    pub bind_address: String,

    /// TCP port. 0 asks the OS for an ephemeral port.
    pub port: u16,

    /// Maximum aggregated request body size in bytes.
    pub max_body_size: usize,
}

impl ListenerConfig {
    /// `bind_address:port`, bracketing IPv6 addresses.
    pub fn socket_address(&self) -> String {
        if self.bind_address.contains(':') {
            format!("[{}]:{}", self.bind_address, self.port)
        } else {
            format!("{}:{}", self.bind_address, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Shut the server down on SIGINT/SIGTERM.
    pub handle_signals: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            handle_signals: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
