//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object whose `type` field selects the variant.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Frame sent by a client
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Chat submission; the payload must be a JSON object
    Message {
        #[serde(rename = "chatMessage")]
        chat_message: Map<String, Value>,
    },
    /// Any other frame kind. Accepted and ignored.
    #[serde(other)]
    Unsupported,
}

/// Frame sent by the server
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Recent room messages, newest first. Sent once per connection.
    History { messages: Vec<ChatMessageDto> },
    /// One relayed message
    Message {
        #[serde(rename = "chatMessage")]
        chat_message: ChatMessageDto,
    },
    /// Current room occupancy
    UserCount { count: usize },
}

/// Chat message as seen on the wire: the client payload plus `timestamp`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessageDto {
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    pub timestamp: String,
}
