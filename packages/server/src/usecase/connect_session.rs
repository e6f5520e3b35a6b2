//! UseCase: セッション接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute() メソッド
//! - Room への参加、人数のブロードキャスト、履歴の再送
//!
//! ### なぜこのテストが必要か
//! - 履歴は接続ごとにちょうど 1 回、その接続にだけ送られる必要がある
//! - 最初の接続かどうかに関係なく履歴が届くことを保証する
//! - 履歴ストアが落ちていても参加自体は成功することを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：空の Room への参加、既存メンバーのいる Room への参加
//! - 異常系：履歴ストアの読み込み失敗

use std::sync::Arc;

use crate::domain::{ChatHistory, PusherChannel, RoomEvent, RoomId, Session};

use super::{error::ConnectError, room_broadcaster::RoomBroadcaster};

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    /// RoomBroadcaster（参加者管理とブロードキャスト）
    broadcaster: Arc<RoomBroadcaster>,
    /// ChatHistory（履歴ストアの抽象化）
    history: Arc<ChatHistory>,
}

impl ConnectSessionUseCase {
    /// 新しい ConnectSessionUseCase を作成
    pub fn new(broadcaster: Arc<RoomBroadcaster>, history: Arc<ChatHistory>) -> Self {
        Self {
            broadcaster,
            history,
        }
    }

    /// セッション接続を実行
    ///
    /// 1. Room に参加し、全メンバーに人数を送信
    /// 2. この接続にだけ履歴を 1 回送信
    ///
    /// 1 と 2 は Room のゲート内で行うため、並行して送信されたメッセージは
    /// 履歴かライブ配信のどちらか一方でだけ届き、履歴より先には届かない。
    ///
    /// # Arguments
    ///
    /// * `room_id` - 参加する Room の ID
    /// * `sender` - クライアントへのフレーム送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Session)` - Joined 状態のセッション
    /// * `Err(ConnectError)` - 接続失敗
    pub async fn execute(
        &self,
        room_id: RoomId,
        sender: PusherChannel,
    ) -> Result<Session, ConnectError> {
        let mut session = Session::new(room_id);
        session.mark_joined()?;

        // 履歴の送信が終わるまで、この Room へのメッセージ配信を止める
        let _guard = self.broadcaster.enter_room(session.room_id()).await;

        // 1. Room に参加（人数のブロードキャストを含む）
        let user_count = self.broadcaster.join(&session, sender).await;
        tracing::info!(
            "Session '{}' joined room '{}' ({} users)",
            session.id(),
            session.room_id(),
            user_count
        );

        // 2. 履歴をこの接続にだけ送信
        self.replay_history(&session).await;

        Ok(session)
    }

    /// 履歴を読み込み、1 つの history フレームとして送信
    ///
    /// 読み込みに失敗した場合は空の履歴として扱う。
    async fn replay_history(&self, session: &Session) {
        let messages = match self.history.read_history(session.room_id()).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(
                    "Failed to read history for room '{}', replaying none: {}",
                    session.room_id(),
                    e
                );
                Vec::new()
            }
        };

        let replayed = messages.len();
        match self
            .broadcaster
            .push_to(session, RoomEvent::History(messages))
            .await
        {
            Ok(()) => tracing::debug!(
                "Replayed {} messages to session '{}'",
                replayed,
                session.id()
            ),
            Err(e) => tracing::warn!(
                "Failed to replay history to session '{}': {}",
                session.id(),
                e
            ),
        }
    }
}
