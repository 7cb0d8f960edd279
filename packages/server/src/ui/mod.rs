//! TCP chat server implementation.

mod config;
mod error;
mod server;
pub mod session;
mod signal;

pub use config::{DEFAULT_HOST, DEFAULT_PORT, ServerConfig};
pub use error::ServerError;
pub use server::Server;
pub use session::{Session, SessionHandle};
pub use signal::shutdown_signal;
