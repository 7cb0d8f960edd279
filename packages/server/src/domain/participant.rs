//! Participant capability
//!
//! ブロードキャストされたメッセージを受け取れるもの（= 参加者）の抽象。
//! 本番では Session のハンドルが実装し、テストではレコーダーや mock が実装する。

use std::fmt;

use uuid::Uuid;

use super::message::Message;

/// Stable identity of a participant.
///
/// Hub membership is keyed by this id, so `leave` only needs the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ParticipantId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Factory for new participant ids
pub struct ParticipantIdFactory;

impl ParticipantIdFactory {
    /// Generate a random (UUID v4) participant id.
    pub fn generate() -> ParticipantId {
        ParticipantId(Uuid::new_v4())
    }
}

/// Something that accepts a message and schedules it for delivery to one
/// endpoint.
///
/// `deliver` is called while the hub holds its lock, so it must only enqueue
/// and never wait on I/O.
#[cfg_attr(test, mockall::automock)]
pub trait Participant: Send + Sync {
    /// Identity used for hub membership.
    fn id(&self) -> ParticipantId;

    /// Schedule `message` for delivery.
    fn deliver(&self, message: &Message);
}


#[cfg(test)]
pub(crate) mod testing {
    //! Test doubles for the participant capability.

    use std::sync::Mutex;

    use super::*;

    /// Participant that records every delivered message.
    pub(crate) struct RecordingParticipant {
        pub(crate) id: ParticipantId,
        received: Mutex<Vec<Message>>,
    }

    impl RecordingParticipant {
        pub(crate) fn new() -> std::sync::Arc<Self> {
            std::sync::Arc::new(Self {
                id: ParticipantIdFactory::generate(),
                received: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn received(&self) -> Vec<String> {
            self.received
                .lock()
                .unwrap()
                .iter()
                .map(|m| m.as_str().to_string())
                .collect()
        }
    }

    impl Participant for RecordingParticipant {
        fn id(&self) -> ParticipantId {
            self.id
        }

        fn deliver(&self, message: &Message) {
            self.received.lock().unwrap().push(message.clone());
        }
    }
}
