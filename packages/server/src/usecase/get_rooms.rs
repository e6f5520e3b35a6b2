//! UseCase: ルーム一覧取得処理

use std::sync::Arc;

use crate::domain::RoomSummary;

use super::room_broadcaster::RoomBroadcaster;

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    broadcaster: Arc<RoomBroadcaster>,
}

impl GetRoomsUseCase {
    /// 新しい GetRoomsUseCase を作成
    pub fn new(broadcaster: Arc<RoomBroadcaster>) -> Self {
        Self { broadcaster }
    }

    /// 接続中のセッションがいる Room の一覧を ID 順で返す
    pub async fn execute(&self) -> Vec<RoomSummary> {
        self.broadcaster.rooms().await
    }
}
