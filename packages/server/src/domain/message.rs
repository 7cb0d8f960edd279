//! Message value object.

use std::{fmt, sync::Arc};

use super::error::MessageError;

/// A single line of chat text.
///
/// The text never contains the newline delimiter. It is stored in a shared
/// buffer, so cloning a `Message` for fan-out does not copy the text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message(Arc<str>);

impl Message {
    /// Create a new message.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::ContainsDelimiter`] if `text` contains `'\n'`.
    pub fn new(text: impl Into<String>) -> Result<Self, MessageError> {
        let text = text.into();
        if text.contains('\n') {
            return Err(MessageError::ContainsDelimiter);
        }
        Ok(Self(Arc::from(text)))
    }

    /// Build the line relayed for text received from `peer`.
    ///
    /// Format: `"<peer>: <text>"`.
    pub fn from_peer(peer: &str, text: &str) -> Result<Self, MessageError> {
        Self::new(format!("{}: {}", peer, text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
