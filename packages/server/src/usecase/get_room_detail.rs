//! UseCase: ルーム詳細取得処理

use std::sync::Arc;

use crate::domain::{RoomId, RoomSummary};

use super::{error::GetRoomDetailError, room_broadcaster::RoomBroadcaster};

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    broadcaster: Arc<RoomBroadcaster>,
}

impl GetRoomDetailUseCase {
    /// 新しい GetRoomDetailUseCase を作成
    pub fn new(broadcaster: Arc<RoomBroadcaster>) -> Self {
        Self { broadcaster }
    }

    /// ルーム詳細取得を実行
    ///
    /// # Returns
    ///
    /// * `Ok(RoomSummary)` - 接続中のセッションがいる Room
    /// * `Err(GetRoomDetailError::RoomNotFound)` - 誰も接続していない Room
    pub async fn execute(&self, room_id: RoomId) -> Result<RoomSummary, GetRoomDetailError> {
        let user_count = self.broadcaster.member_count(&room_id).await;
        if user_count == 0 {
            return Err(GetRoomDetailError::RoomNotFound);
        }
        Ok(RoomSummary {
            id: room_id,
            user_count,
        })
    }
}
