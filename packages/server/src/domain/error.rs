//! Domain error types.

use thiserror::Error;

use super::{SessionId, SessionState};

/// Errors raised while constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    RoomIdEmpty,

    #[error("invalid timestamp '{0}'")]
    TimestampInvalid(String),
}

/// Errors raised by the session state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },
}

/// Errors raised by a history store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryStoreError {
    #[error("history store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode history record: {0}")]
    Codec(String),
}

/// Errors raised while pushing frames to sessions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("session '{0}' is not registered")]
    ClientNotFound(SessionId),

    #[error("failed to push frame: {0}")]
    PushFailed(String),

    #[error("failed to serialize frame: {0}")]
    Serialization(String),
}
