//! Domain error types.

use thiserror::Error;

/// Errors raised by a framed connection.
///
/// Always handled by the session that owns the connection; never surfaced to
/// other sessions.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The peer closed the stream
    #[error("connection closed by peer")]
    Closed,

    /// The transport failed (reset, broken pipe, ...)
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when constructing a [`Message`](super::Message).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// The text contains the newline delimiter
    #[error("message must not contain a newline")]
    ContainsDelimiter,
}
