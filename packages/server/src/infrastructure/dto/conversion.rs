//! Conversion logic between DTOs and domain entities.

use crate::domain::{ChatMessage, RoomEvent, RoomSummary};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ChatMessage> for dto::ChatMessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            payload: model.payload,
            timestamp: model.timestamp.to_iso8601(),
        }
    }
}

impl From<RoomEvent> for dto::ServerFrame {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::History(messages) => Self::History {
                messages: messages.into_iter().map(Into::into).collect(),
            },
            RoomEvent::Message(message) => Self::Message {
                chat_message: message.into(),
            },
            RoomEvent::UserCount(count) => Self::UserCount { count },
        }
    }
}

impl From<RoomSummary> for http::RoomSummaryDto {
    fn from(model: RoomSummary) -> Self {
        Self {
            id: model.id.into_string(),
            user_count: model.user_count,
        }
    }
}
