//! Bounded history of recently delivered messages.

use std::collections::VecDeque;

use super::message::Message;

/// Number of messages replayed to a newly joined participant by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Ring of the most recent messages, oldest first.
///
/// When a push exceeds the capacity the oldest entry is evicted.
#[derive(Debug, Clone)]
pub struct MessageHistory {
    capacity: usize,
    entries: VecDeque<Message>,
}

impl MessageHistory {
    /// Create an empty history holding at most `capacity` messages.
    ///
    /// Storage grows on demand; only the default capacity is reserved up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
        }
    }

    /// Append a message, evicting the oldest entries past capacity.
    pub fn push(&mut self, message: Message) {
        self.entries.push_back(message);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Iterate from the oldest to the newest message.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: String) -> Message {
        Message::new(text).unwrap()
    }

    #[test]
    fn test_push_keeps_delivery_order() {
        // テスト項目: 追加した順（古い順）に取り出せる
        // given (前提条件):
        let mut history = MessageHistory::default();

        // when (操作):
        for i in 0..3 {
            history.push(message(format!("msg-{}", i)));
        }

        // then (期待する結果):
        let texts: Vec<&str> = history.iter().map(Message::as_str).collect();
        assert_eq!(texts, vec!["msg-0", "msg-1", "msg-2"]);
    }

    #[test]
    fn test_push_evicts_oldest_past_capacity() {
        // テスト項目: 150 件追加すると最新の 100 件だけが古い順に残る
        // given (前提条件):
        let mut history = MessageHistory::default();

        // when (操作):
        for i in 0..150 {
            history.push(message(format!("msg-{}", i)));
        }

        // then (期待する結果):
        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
        let texts: Vec<String> = history.iter().map(|m| m.as_str().to_string()).collect();
        let expected: Vec<String> = (50..150).map(|i| format!("msg-{}", i)).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        // テスト項目: 容量 0 の場合は何も保持しない
        // given (前提条件):
        let mut history = MessageHistory::with_capacity(0);

        // when (操作):
        history.push(message("dropped".to_string()));

        // then (期待する結果):
        assert!(history.is_empty());
        assert_eq!(history.capacity(), 0);
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        // テスト項目: 非常に大きな容量を指定しても生成・追加でパニックしない
        // given (前提条件):
        let mut history = MessageHistory::with_capacity(usize::MAX);

        // when (操作):
        history.push(message("x".to_string()));

        // then (期待する結果):
        assert_eq!(history.len(), 1);
        assert_eq!(history.capacity(), usize::MAX);
    }
}
