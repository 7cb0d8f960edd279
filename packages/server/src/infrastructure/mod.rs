//! Infrastructure layer
//!
//! - `connection`: 改行区切りのフレーミング（ソケット読み書き）
//! - `hub`: `Broadcaster` trait のインメモリ実装

pub mod connection;
pub mod hub;

pub use connection::{FramedConnection, FramedReader, FramedWriter};
pub use hub::BroadcastHub;
