//! Server configuration.

use crate::domain::DEFAULT_HISTORY_CAPACITY;

/// Default port
pub const DEFAULT_PORT: u16 = 1234;

/// Default host address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Configuration for [`Server`](super::Server).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to bind to (0 picks an ephemeral port)
    pub port: u16,
    /// Number of recent messages replayed to newly joined clients
    pub history_capacity: usize,
}

impl ServerConfig {
    /// `host:port` string passed to the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}
