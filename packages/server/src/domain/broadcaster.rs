//! Broadcaster trait 定義
//!
//! Session が必要とする Hub のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層の `BroadcastHub` が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    message::Message,
    participant::{Participant, ParticipantId},
};

/// Shared membership plus fan-out.
///
/// ## 保証
///
/// - `join` で追加された参加者には、それまでの履歴が古い順に一度だけ再送される
/// - 再送とライブ配信が同じメッセージを二重に届けたり、取りこぼしたりしない
/// - `leave` は冪等（未参加・離脱済みの ID を渡してもエラーにならない）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Add `participant` to the membership and replay the history to it.
    async fn join(&self, participant: Arc<dyn Participant>);

    /// Remove the participant with `id`, if present.
    async fn leave(&self, id: &ParticipantId);

    /// Record `message` in the history and deliver it to every member.
    async fn deliver(&self, message: Message);
}
