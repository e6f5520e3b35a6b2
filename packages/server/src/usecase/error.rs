//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{HistoryStoreError, SessionError};

/// 接続処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("session could not join: {0}")]
    InvalidSessionState(#[from] SessionError),
}

/// 切断処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    #[error("session is already disconnected")]
    AlreadyDisconnected,

    #[error("session was not a member of its room")]
    NotInRoom,
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("session cannot send messages: {0}")]
    NotJoined(#[from] SessionError),
}

/// 履歴取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetHistoryError {
    #[error(transparent)]
    StoreUnavailable(#[from] HistoryStoreError),
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("room not found")]
    RoomNotFound,
}
