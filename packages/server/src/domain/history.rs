//! Bounded chat history.
//!
//! `HistoryStore` is the contract of the external list store (push-to-front,
//! range-read, trim). `ChatHistory` layers the chat semantics on top of it:
//! record encoding, the per-room key, and the retention cap.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ChatMessage, HistoryStoreError, RoomId};

/// Number of records kept per room (indices `0..=50`)
pub const HISTORY_CAPACITY: usize = 51;

const HISTORY_KEY_PREFIX: &str = "chat:";

/// Ordered list-per-key store
///
/// Lists are newest-first. Indices are zero-based and `stop` is inclusive.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert a value at the head of the list, returning the new length
    async fn push_front(&self, key: &str, value: String) -> Result<usize, HistoryStoreError>;

    /// Read `start..=stop` (`None` reads to the end). Missing keys read as empty.
    async fn range(
        &self,
        key: &str,
        start: usize,
        stop: Option<usize>,
    ) -> Result<Vec<String>, HistoryStoreError>;

    /// Keep only `start..=stop`, dropping the key once the list is empty
    async fn trim(&self, key: &str, start: usize, stop: usize) -> Result<(), HistoryStoreError>;
}

/// Per-room message history backed by a `HistoryStore`
pub struct ChatHistory {
    store: Arc<dyn HistoryStore>,
    capacity: usize,
    dedup: bool,
}

impl ChatHistory {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self {
            store,
            capacity: HISTORY_CAPACITY,
            dedup: false,
        }
    }

    /// Skip appending a message whose content equals the newest record.
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a message at the head of the room's history and trim to capacity.
    ///
    /// Returns `Ok(false)` if the message was skipped as a duplicate.
    pub async fn append_message(
        &self,
        room_id: &RoomId,
        message: &ChatMessage,
    ) -> Result<bool, HistoryStoreError> {
        let key = history_key(room_id);

        if self.dedup && self.is_duplicate_of_head(&key, message).await? {
            tracing::debug!("Skipping duplicate message for room '{}'", room_id);
            return Ok(false);
        }

        let record =
            serde_json::to_string(message).map_err(|e| HistoryStoreError::Codec(e.to_string()))?;

        self.store.push_front(&key, record).await?;
        self.store.trim(&key, 0, self.capacity - 1).await?;

        Ok(true)
    }

    /// Read the whole history of a room, newest first.
    ///
    /// Records that cannot be decoded are logged and skipped.
    pub async fn read_history(&self, room_id: &RoomId) -> Result<Vec<ChatMessage>, HistoryStoreError> {
        let records = self.store.range(&history_key(room_id), 0, None).await?;

        Ok(records
            .iter()
            .filter_map(|record| match serde_json::from_str::<ChatMessage>(record) {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!(
                        "Skipping undecodable history record in room '{}': {}",
                        room_id,
                        e
                    );
                    None
                }
            })
            .collect())
    }

    async fn is_duplicate_of_head(
        &self,
        key: &str,
        message: &ChatMessage,
    ) -> Result<bool, HistoryStoreError> {
        let head = self.store.range(key, 0, Some(0)).await?;
        Ok(head
            .first()
            .and_then(|record| serde_json::from_str::<ChatMessage>(record).ok())
            .is_some_and(|newest| newest.content_key() == message.content_key()))
    }
}

/// Store key of a room's history list
pub fn history_key(room_id: &RoomId) -> String {
    format!("{}{}", HISTORY_KEY_PREFIX, room_id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::Timestamp, infrastructure::history::InMemoryHistoryStore};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{Value, json};

    fn room(name: &str) -> RoomId {
        RoomId::new(name.to_string()).unwrap()
    }

    fn message(text: &str, seconds: i64) -> ChatMessage {
        let base = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
        let Value::Object(payload) = json!({ "text": text }) else {
            unreachable!()
        };
        ChatMessage::received(payload, Timestamp::new(base + Duration::seconds(seconds)))
    }

    fn texts(messages: &[ChatMessage]) -> Vec<String> {
        messages
            .iter()
            .map(|m| m.payload["text"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_history_key_uses_chat_prefix() {
        // テスト項目: 履歴キーは "chat:" プレフィックス付きで生成される
        // given (前提条件):
        let room_id = room("place-1");

        // when (操作):
        let key = history_key(&room_id);

        // then (期待する結果):
        assert_eq!(key, "chat:place-1");
    }

    #[tokio::test]
    async fn test_read_history_of_unknown_room_is_empty() {
        // テスト項目: 履歴のない Room は空リストを返す
        // given (前提条件):
        let history = ChatHistory::new(Arc::new(InMemoryHistoryStore::new()));

        // when (操作):
        let result = history.read_history(&room("nowhere")).await.unwrap();

        // then (期待する結果):
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_read_history_is_newest_first() {
        // テスト項目: 履歴は新しい順に返される
        // given (前提条件):
        let history = ChatHistory::new(Arc::new(InMemoryHistoryStore::new()));
        for (i, text) in ["first", "second", "third"].iter().enumerate() {
            history
                .append_message(&room("X"), &message(text, i as i64))
                .await
                .unwrap();
        }

        // when (操作):
        let result = history.read_history(&room("X")).await.unwrap();

        // then (期待する結果):
        assert_eq!(texts(&result), vec!["third", "second", "first"]);
        assert_eq!(result[0].timestamp, message("third", 2).timestamp);
    }

    #[tokio::test]
    async fn test_append_sixty_messages_keeps_latest_fifty_one() {
        // テスト項目: 60 件追加すると最新の 51 件だけが残る
        // given (前提条件):
        let store = Arc::new(InMemoryHistoryStore::new());
        let history = ChatHistory::new(store.clone());

        // when (操作):
        for i in 0..60 {
            history
                .append_message(&room("X"), &message(&format!("m{}", i), i))
                .await
                .unwrap();
        }
        let result = history.read_history(&room("X")).await.unwrap();

        // then (期待する結果):
        assert_eq!(result.len(), HISTORY_CAPACITY);
        let expected: Vec<String> = (9..60).rev().map(|i| format!("m{}", i)).collect();
        assert_eq!(texts(&result), expected);
        assert_eq!(store.len("chat:X").await, HISTORY_CAPACITY);
    }

    #[tokio::test]
    async fn test_rooms_have_independent_histories() {
        // テスト項目: Room ごとに履歴が独立している
        // given (前提条件):
        let history = ChatHistory::new(Arc::new(InMemoryHistoryStore::new()));

        // when (操作):
        history.append_message(&room("X"), &message("in x", 0)).await.unwrap();
        history.append_message(&room("Y"), &message("in y", 1)).await.unwrap();

        // then (期待する結果):
        assert_eq!(texts(&history.read_history(&room("X")).await.unwrap()), vec!["in x"]);
        assert_eq!(texts(&history.read_history(&room("Y")).await.unwrap()), vec!["in y"]);
    }

    #[tokio::test]
    async fn test_read_history_skips_undecodable_records() {
        // テスト項目: 復元できないレコードはスキップされる
        // given (前提条件):
        let store = Arc::new(InMemoryHistoryStore::new());
        let history = ChatHistory::new(store.clone());
        history.append_message(&room("X"), &message("ok", 0)).await.unwrap();
        store.push_front("chat:X", "not json".to_string()).await.unwrap();

        // when (操作):
        let result = history.read_history(&room("X")).await.unwrap();

        // then (期待する結果):
        assert_eq!(texts(&result), vec!["ok"]);
    }

    #[tokio::test]
    async fn test_dedup_skips_consecutive_duplicate_content() {
        // テスト項目: dedup 有効時、直前と同じ内容のメッセージは保存されない
        // given (前提条件):
        let history =
            ChatHistory::new(Arc::new(InMemoryHistoryStore::new())).with_dedup(true);
        history.append_message(&room("X"), &message("hi", 0)).await.unwrap();

        // when (操作): タイムスタンプだけが異なる同内容のメッセージを追加
        let appended = history.append_message(&room("X"), &message("hi", 5)).await.unwrap();
        let other = history.append_message(&room("X"), &message("bye", 6)).await.unwrap();

        // then (期待する結果):
        assert!(!appended);
        assert!(other);
        assert_eq!(
            texts(&history.read_history(&room("X")).await.unwrap()),
            vec!["bye", "hi"]
        );
    }

    #[tokio::test]
    async fn test_without_dedup_identical_content_is_kept() {
        // テスト項目: dedup 無効時は同内容のメッセージもすべて保存される
        // given (前提条件):
        let history = ChatHistory::new(Arc::new(InMemoryHistoryStore::new()));

        // when (操作):
        history.append_message(&room("X"), &message("hi", 0)).await.unwrap();
        history.append_message(&room("X"), &message("hi", 1)).await.unwrap();

        // then (期待する結果):
        assert_eq!(history.read_history(&room("X")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_trim_is_skipped_when_push_fails() {
        // テスト項目: push に失敗した場合は trim が呼ばれずエラーが返される
        // given (前提条件):
        let mut store = MockHistoryStore::new();
        store
            .expect_push_front()
            .returning(|_, _| Err(HistoryStoreError::Unavailable("down".to_string())));
        store.expect_trim().never();
        let history = ChatHistory::new(Arc::new(store));

        // when (操作):
        let result = history.append_message(&room("X"), &message("hi", 0)).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(HistoryStoreError::Unavailable("down".to_string()))
        );
    }

    #[tokio::test]
    async fn test_trim_runs_after_every_push() {
        // テスト項目: push の直後に必ず 0..=50 への trim が行われる
        // given (前提条件):
        let mut store = MockHistoryStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_push_front()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(1));
        store
            .expect_trim()
            .withf(|key, start, stop| key.to_string() == "chat:X" && *start == 0 && *stop == 50)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        let history = ChatHistory::new(Arc::new(store));

        // when (操作):
        let result = history.append_message(&room("X"), &message("hi", 0)).await;

        // then (期待する結果):
        assert_eq!(result, Ok(true));
    }
}
