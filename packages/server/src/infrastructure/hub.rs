//! インメモリ Broadcast Hub 実装
//!
//! ドメイン層が定義する `Broadcaster` trait の具体的な実装。
//! 参加者の集合と直近のメッセージ履歴を 1 つの Mutex で保護します。
//!
//! ## 排他制御
//!
//! `join`（追加 + 履歴の再送）と `deliver`（履歴への追加 + 配信）は同じロックの
//! 中で完結するため、参加直後の参加者に同じメッセージが二重に届いたり、
//! 取りこぼされたりすることはありません。`Participant::deliver` はキューに積むだけで
//! I/O を待たないので、ロック保持中に呼び出しても問題ありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Broadcaster, DEFAULT_HISTORY_CAPACITY, Message, MessageHistory, Participant, ParticipantId,
};

struct HubState {
    members: HashMap<ParticipantId, Arc<dyn Participant>>,
    history: MessageHistory,
}

/// Shared membership and bounded history for one server process.
pub struct BroadcastHub {
    state: Mutex<HubState>,
}

impl BroadcastHub {
    /// Create a hub that replays the last [`DEFAULT_HISTORY_CAPACITY`] messages.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a hub that replays at most `history_capacity` messages.
    pub fn with_capacity(history_capacity: usize) -> Self {
        Self {
            state: Mutex::new(HubState {
                members: HashMap::new(),
                history: MessageHistory::with_capacity(history_capacity),
            }),
        }
    }

    /// Number of current members
    pub async fn member_count(&self) -> usize {
        self.state.lock().await.members.len()
    }

    pub async fn is_member(&self, id: &ParticipantId) -> bool {
        self.state.lock().await.members.contains_key(id)
    }

    /// Copy of the history, oldest first
    pub async fn history_snapshot(&self) -> Vec<Message> {
        self.state.lock().await.history.iter().cloned().collect()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broadcaster for BroadcastHub {
    async fn join(&self, participant: Arc<dyn Participant>) {
        let id = participant.id();
        let mut state = self.state.lock().await;

        if state.members.contains_key(&id) {
            tracing::warn!("Participant '{}' already joined, ignoring", id);
            return;
        }

        for message in state.history.iter() {
            participant.deliver(message);
        }
        tracing::debug!(
            "Replayed {} message(s) to participant '{}'",
            state.history.len(),
            id
        );

        state.members.insert(id, participant);
        tracing::info!(
            "Participant '{}' joined ({} member(s))",
            id,
            state.members.len()
        );
    }

    async fn leave(&self, id: &ParticipantId) {
        let mut state = self.state.lock().await;
        if state.members.remove(id).is_some() {
            tracing::info!(
                "Participant '{}' left ({} member(s))",
                id,
                state.members.len()
            );
        } else {
            tracing::debug!("Participant '{}' is not a member, nothing to remove", id);
        }
    }

    async fn deliver(&self, message: Message) {
        let mut state = self.state.lock().await;
        state.history.push(message.clone());

        for participant in state.members.values() {
            participant.deliver(&message);
        }
        tracing::debug!(
            "Delivered message to {} member(s): {}",
            state.members.len(),
            message
        );
    }
}
