//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - セッションごとの `UnboundedSender` を管理
//! - `RoomEvent` を JSON フレームにエンコードして送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の受付と sender の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された sender を受け取り、フレームの送信にだけ使用します。
//! 送信先の選定は UseCase 層（`RoomBroadcaster`）の責務です。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{MessagePushError, MessagePusher, PusherChannel, RoomEvent, SessionId},
    infrastructure::dto::websocket::ServerFrame,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.register_client(session_id, tx).await;
/// pusher.push_to(&session_id, &RoomEvent::UserCount(1)).await?;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のセッションの WebSocket sender
    clients: Mutex<HashMap<SessionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録中のセッション数を取得
    #[cfg(test)]
    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }
}

/// RoomEvent を送信用の JSON 文字列にエンコード
fn encode(event: &RoomEvent) -> Result<String, MessagePushError> {
    let frame = ServerFrame::from(event.clone());
    serde_json::to_string(&frame).map_err(|e| MessagePushError::Serialization(e.to_string()))
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, session_id: SessionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(session_id, sender);
        tracing::debug!("Session '{}' registered to MessagePusher", session_id);
    }

    async fn unregister_client(&self, session_id: &SessionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(session_id);
        tracing::debug!("Session '{}' unregistered from MessagePusher", session_id);
    }

    async fn push_to(
        &self,
        session_id: &SessionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let content = encode(event)?;
        let clients = self.clients.lock().await;

        let sender = clients
            .get(session_id)
            .ok_or(MessagePushError::ClientNotFound(*session_id))?;
        sender
            .send(content)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed frame to session '{}'", session_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: &[SessionId],
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        if targets.is_empty() {
            return Ok(());
        }

        let content = encode(event)?;
        let clients = self.clients.lock().await;

        for target in targets {
            let Some(sender) = clients.get(target) else {
                tracing::warn!("Session '{}' not found during broadcast, skipping", target);
                continue;
            };
            if sender.is_closed() {
                tracing::debug!("Session '{}' transport already closed, skipping", target);
                continue;
            }
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = sender.send(content.clone()) {
                tracing::warn!("Failed to push frame to session '{}': {}", target, e);
            }
        }

        Ok(())
    }
}
