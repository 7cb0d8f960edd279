//! Message formatting utilities for client display.

use hiroba_shared::time::{Clock, to_local_hms};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a line received from the server
    ///
    /// # Arguments
    ///
    /// * `line` - The broadcast line (already prefixed with the sender address)
    /// * `clock` - Clock used for the receive time
    ///
    /// # Returns
    ///
    /// A formatted string starting on a fresh line, so it does not collide
    /// with a half-typed prompt
    pub fn format_incoming(line: &str, clock: &dyn Clock) -> String {
        format!("\r[{}] {}\n", to_local_hms(clock.now()), line)
    }

    /// Format the banner shown once connected
    pub fn format_connected(addr: &str) -> String {
        format!(
            "\nConnected to {}. Type messages and press Enter to send. Press Ctrl+C to exit.\n\n",
            addr
        )
    }
}
