//! Domain layer
//!
//! チャットの中核となる型と trait を定義します。
//! 具体的な実装（Hub、ソケット）は Infrastructure 層と UI 層が提供します。

pub mod broadcaster;
pub mod error;
pub mod history;
pub mod message;
pub mod participant;

pub use broadcaster::Broadcaster;
pub use error::{ConnectionError, MessageError};
pub use history::{DEFAULT_HISTORY_CAPACITY, MessageHistory};
pub use message::Message;
pub use participant::{Participant, ParticipantId, ParticipantIdFactory};
