//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - サーバー時刻の付与、履歴への追加、送信者以外へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者にメッセージがエコーされないことを保証
//! - 履歴ストアへの書き込みに失敗してもライブ配信は続くことを確認
//! - クライアントが送った timestamp がサーバー時刻で上書きされることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト
//! - 異常系：履歴ストアの書き込み失敗、切断済みセッションからの送信
//! - エッジケース：送信者のみが接続している場合（ブロードキャスト対象なし）

use std::sync::Arc;

use hiroba_shared::time::Clock;
use serde_json::{Map, Value};

use crate::domain::{ChatHistory, ChatMessage, Session, SessionId, Timestamp};

use super::{error::SendMessageError, room_broadcaster::RoomBroadcaster};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// RoomBroadcaster（参加者管理とブロードキャスト）
    broadcaster: Arc<RoomBroadcaster>,
    /// ChatHistory（履歴ストアの抽象化）
    history: Arc<ChatHistory>,
    /// 受信時刻の取得元
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        broadcaster: Arc<RoomBroadcaster>,
        history: Arc<ChatHistory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            broadcaster,
            history,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `session` - 送信者のセッション
    /// * `payload` - クライアントから受け取った chatMessage の中身
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<SessionId>)` - ブロードキャスト対象のセッション ID リスト
    /// * `Err(SendMessageError)` - 送信者がメッセージを送れる状態にない
    pub async fn execute(
        &self,
        session: &mut Session,
        payload: Map<String, Value>,
    ) -> Result<Vec<SessionId>, SendMessageError> {
        session.mark_active()?;

        // 1. サーバー時刻を付与
        let message = ChatMessage::received(payload, Timestamp::from(self.clock.now()));

        // 履歴への追加とブロードキャストの間に参加者が割り込まないようにする
        let _guard = self.broadcaster.enter_room(session.room_id()).await;

        // 2. 履歴に追加（失敗してもライブ配信は続ける）
        match self
            .history
            .append_message(session.room_id(), &message)
            .await
        {
            Ok(true) => {}
            Ok(false) => tracing::debug!(
                "Duplicate message from session '{}' not stored",
                session.id()
            ),
            Err(e) => tracing::warn!(
                "Failed to store message for room '{}', relaying without history: {}",
                session.room_id(),
                e
            ),
        }

        // 3. 送信者以外にブロードキャスト
        let targets = self.broadcaster.broadcast_message(session, message).await;
        tracing::debug!(
            "Relayed message from session '{}' to {} sessions",
            session.id(),
            targets.len()
        );

        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{HistoryStoreError, RoomId, SessionError, SessionState, history::MockHistoryStore},
        infrastructure::{
            history::InMemoryHistoryStore, message_pusher::WebSocketMessagePusher,
        },
    };
    use chrono::{TimeZone, Utc};
    use hiroba_shared::time::FixedClock;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn room(name: &str) -> RoomId {
        RoomId::new(name.to_string()).unwrap()
    }

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap(),
        ))
    }

    fn create_test_broadcaster() -> Arc<RoomBroadcaster> {
        Arc::new(RoomBroadcaster::new(Arc::new(WebSocketMessagePusher::new())))
    }

    async fn join(
        broadcaster: &RoomBroadcaster,
        room_name: &str,
    ) -> (Session, mpsc::UnboundedReceiver<String>) {
        let mut session = Session::new(room(room_name));
        let (tx, rx) = mpsc::unbounded_channel();
        broadcaster.join(&session, tx).await;
        session.mark_joined().unwrap();
        (session, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    #[tokio::test]
    async fn test_send_message_broadcasts_to_others() {
        // テスト項目: メッセージが送信者以外に届き、送信者にはエコーされない
        // given (前提条件):
        let broadcaster = create_test_broadcaster();
        let history = Arc::new(ChatHistory::new(Arc::new(InMemoryHistoryStore::new())));
        let usecase = SendMessageUseCase::new(broadcaster.clone(), history.clone(), fixed_clock());
        let (mut alice, mut alice_rx) = join(&broadcaster, "X").await;
        let (bob, mut bob_rx) = join(&broadcaster, "X").await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        // when (操作):
        let targets = usecase
            .execute(&mut alice, payload(json!({"text": "hi"})))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(targets, vec![bob.id()]);
        assert_eq!(alice.state(), SessionState::Active);
        assert_eq!(
            drain(&mut bob_rx),
            vec![json!({
                "type": "message",
                "chatMessage": {"text": "hi", "timestamp": "2026-10-16T09:30:00.000Z"}
            })]
        );
        assert!(drain(&mut alice_rx).is_empty());

        let stored = history.read_history(&room("X")).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].payload["text"], json!("hi"));
    }

    #[tokio::test]
    async fn test_send_message_overwrites_client_timestamp() {
        // テスト項目: クライアントが送った timestamp はサーバー時刻で上書きされる
        // given (前提条件):
        let broadcaster = create_test_broadcaster();
        let history = Arc::new(ChatHistory::new(Arc::new(InMemoryHistoryStore::new())));
        let usecase = SendMessageUseCase::new(broadcaster.clone(), history, fixed_clock());
        let (mut alice, _alice_rx) = join(&broadcaster, "X").await;
        let (_bob, mut bob_rx) = join(&broadcaster, "X").await;
        drain(&mut bob_rx);

        // when (操作):
        usecase
            .execute(
                &mut alice,
                payload(json!({"text": "hi", "timestamp": "1999-01-01T00:00:00.000Z"})),
            )
            .await
            .unwrap();

        // then (期待する結果):
        let frames = drain(&mut bob_rx);
        assert_eq!(
            frames[0]["chatMessage"]["timestamp"],
            json!("2026-10-16T09:30:00.000Z")
        );
    }

    #[tokio::test]
    async fn test_send_message_only_sender_in_room() {
        // テスト項目: 送信者のみが接続している場合、ブロードキャスト対象は空だが履歴には残る
        // given (前提条件):
        let broadcaster = create_test_broadcaster();
        let history = Arc::new(ChatHistory::new(Arc::new(InMemoryHistoryStore::new())));
        let usecase = SendMessageUseCase::new(broadcaster.clone(), history.clone(), fixed_clock());
        let (mut alice, mut alice_rx) = join(&broadcaster, "X").await;
        drain(&mut alice_rx);

        // when (操作):
        let targets = usecase
            .execute(&mut alice, payload(json!({"text": "alone"})))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(targets.is_empty());
        assert!(drain(&mut alice_rx).is_empty());
        assert_eq!(history.read_history(&room("X")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_message_relays_when_history_store_is_down() {
        // テスト項目: 履歴ストアへの書き込みに失敗してもブロードキャストは行われる
        // given (前提条件):
        let mut store = MockHistoryStore::new();
        store
            .expect_push_front()
            .returning(|_, _| Err(HistoryStoreError::Unavailable("down".to_string())));
        store.expect_trim().never();
        let history = Arc::new(ChatHistory::new(Arc::new(store)));
        let broadcaster = create_test_broadcaster();
        let usecase = SendMessageUseCase::new(broadcaster.clone(), history, fixed_clock());
        let (mut alice, _alice_rx) = join(&broadcaster, "X").await;
        let (bob, mut bob_rx) = join(&broadcaster, "X").await;
        drain(&mut bob_rx);

        // when (操作):
        let result = usecase
            .execute(&mut alice, payload(json!({"text": "still here"})))
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok(vec![bob.id()]));
        let frames = drain(&mut bob_rx);
        assert_eq!(frames[0]["chatMessage"]["text"], json!("still here"));
    }

    #[tokio::test]
    async fn test_send_message_from_closed_session() {
        // テスト項目: 切断済みセッションからの送信はエラーになり、何も配信されない
        // given (前提条件):
        let broadcaster = create_test_broadcaster();
        let history = Arc::new(ChatHistory::new(Arc::new(InMemoryHistoryStore::new())));
        let usecase = SendMessageUseCase::new(broadcaster.clone(), history.clone(), fixed_clock());
        let (mut alice, _alice_rx) = join(&broadcaster, "X").await;
        let (_bob, mut bob_rx) = join(&broadcaster, "X").await;
        drain(&mut bob_rx);
        alice.close();

        // when (操作):
        let result = usecase
            .execute(&mut alice, payload(json!({"text": "ghost"})))
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::NotJoined(SessionError::InvalidTransition {
                from: SessionState::Closed,
                to: SessionState::Active,
            }))
        );
        assert!(drain(&mut bob_rx).is_empty());
        assert!(history.read_history(&room("X")).await.unwrap().is_empty());
    }
}
