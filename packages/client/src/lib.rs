//! Interactive chat client for the Hiroba server.
//!
//! Reads lines from the terminal, sends each one to the server and prints
//! every line the server broadcasts.

mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use error::ClientError;
pub use runner::run_client;
