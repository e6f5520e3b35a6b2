//! UseCase: 履歴取得処理

use std::sync::Arc;

use crate::domain::{ChatHistory, ChatMessage, RoomId};

use super::error::GetHistoryError;

/// Room の履歴取得のユースケース
pub struct GetHistoryUseCase {
    /// ChatHistory（履歴ストアの抽象化）
    history: Arc<ChatHistory>,
}

impl GetHistoryUseCase {
    /// 新しい GetHistoryUseCase を作成
    pub fn new(history: Arc<ChatHistory>) -> Self {
        Self { history }
    }

    /// 履歴取得を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ChatMessage>)` - 新しい順のメッセージ（未知の Room は空）
    /// * `Err(GetHistoryError)` - 履歴ストアに到達できない
    pub async fn execute(&self, room_id: RoomId) -> Result<Vec<ChatMessage>, GetHistoryError> {
        Ok(self.history.read_history(&room_id).await?)
    }
}
