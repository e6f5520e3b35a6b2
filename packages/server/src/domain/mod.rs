//! Domain layer for the chat relay.
//!
//! Entities, value objects, the room registry, and the interfaces the domain
//! needs from the outside world (history store, message pusher).

pub mod entity;
pub mod error;
pub mod history;
pub mod pusher;
pub mod registry;
pub mod value_object;

pub use entity::{ChatMessage, RoomEvent, RoomSummary, Session, SessionState};
pub use error::{HistoryStoreError, MessagePushError, SessionError, ValueObjectError};
pub use history::{ChatHistory, HistoryStore};
pub use pusher::{MessagePusher, PusherChannel};
pub use registry::RoomRegistry;
pub use value_object::{RoomId, SessionId, Timestamp};
