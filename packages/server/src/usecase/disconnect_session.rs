//! UseCase: セッション切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectSessionUseCase::execute() メソッド
//! - Room からの削除と、残りのメンバーへの人数通知
//!
//! ### なぜこのテストが必要か
//! - 切断は冪等である必要がある（二重切断で古い人数を送らない）
//! - 最後のメンバーが抜けた Room はレジストリから消える必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：メンバーの切断と通知
//! - エッジケース：最後のメンバーの切断
//! - 異常系：同じセッションの二重切断

use std::sync::Arc;

use crate::domain::Session;

use super::{error::DisconnectError, room_broadcaster::RoomBroadcaster};

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    /// RoomBroadcaster（参加者管理とブロードキャスト）
    broadcaster: Arc<RoomBroadcaster>,
}

impl DisconnectSessionUseCase {
    /// 新しい DisconnectSessionUseCase を作成
    pub fn new(broadcaster: Arc<RoomBroadcaster>) -> Self {
        Self { broadcaster }
    }

    /// セッション切断を実行
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 切断後の Room の人数
    /// * `Err(DisconnectError)` - 既に切断済み、または Room に存在しない
    pub async fn execute(&self, session: &mut Session) -> Result<usize, DisconnectError> {
        // 1. セッションを Closed に遷移（二重切断はここで止まる）
        if !session.close() {
            return Err(DisconnectError::AlreadyDisconnected);
        }

        // 2. Room から削除し、残りのメンバーに人数を送信
        let remaining = self
            .broadcaster
            .leave(session)
            .await
            .ok_or(DisconnectError::NotInRoom)?;

        tracing::info!(
            "Session '{}' left room '{}' ({} users remain)",
            session.id(),
            session.room_id(),
            remaining
        );

        Ok(remaining)
    }
}
