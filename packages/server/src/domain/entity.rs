//! Domain entities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{RoomId, SessionError, SessionId, Timestamp};

/// Payload field overwritten by the server on receipt
const TIMESTAMP_FIELD: &str = "timestamp";

/// One chat message as relayed and stored
///
/// The payload is application-defined; the server only owns `timestamp`.
/// Serializes as a single flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    /// Build a message from a client payload, stamping it with the receipt time.
    ///
    /// Any `timestamp` supplied by the sender is discarded.
    pub fn received(mut payload: Map<String, Value>, timestamp: Timestamp) -> Self {
        payload.remove(TIMESTAMP_FIELD);
        Self { payload, timestamp }
    }

    /// Canonical serialization of the payload, excluding the server timestamp.
    ///
    /// Object keys are sorted at every depth so two payloads with the same
    /// content always yield the same key.
    pub fn content_key(&self) -> String {
        let mut out = String::new();
        write_canonical(&Value::Object(self.payload.clone()), &mut out);
        out
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Lifecycle of a session
///
/// `Connecting → Joined → (Active)* → Closed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Joined,
    Active,
    Closed,
}

/// One live client connection bound to a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    room_id: RoomId,
    state: SessionState,
}

impl Session {
    /// Create a new session in the `Connecting` state
    pub fn new(room_id: RoomId) -> Self {
        Self {
            id: SessionId::generate(),
            room_id,
            state: SessionState::Connecting,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `Connecting → Joined`
    pub fn mark_joined(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Joined, |from| {
            from == SessionState::Connecting
        })
    }

    /// `Joined | Active → Active`
    pub fn mark_active(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Active, |from| {
            matches!(from, SessionState::Joined | SessionState::Active)
        })
    }

    /// Move to `Closed`.
    ///
    /// Returns `false` if the session was already closed.
    pub fn close(&mut self) -> bool {
        if self.state == SessionState::Closed {
            return false;
        }
        self.state = SessionState::Closed;
        true
    }

    fn transition(
        &mut self,
        to: SessionState,
        allowed_from: impl Fn(SessionState) -> bool,
    ) -> Result<(), SessionError> {
        if !allowed_from(self.state) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}

/// Outbound event delivered to sessions of a room
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// Recent messages, newest first
    History(Vec<ChatMessage>),
    /// One relayed chat message
    Message(ChatMessage),
    /// Current occupancy of the room
    UserCount(usize),
}

/// Occupancy snapshot of an active room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub id: RoomId,
    pub user_count: usize,
}
