//! Server startup errors.

use thiserror::Error;

/// Errors that abort server startup.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening address could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The bound socket did not report its local address
    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),
}
