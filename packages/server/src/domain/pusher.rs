//! Outbound delivery interface.
//!
//! The use case layer decides who receives an event; implementations of
//! `MessagePusher` own the per-session transport channels and the wire format.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{MessagePushError, RoomEvent, SessionId};

/// Outbound channel of one session, carrying encoded frames
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register the outbound channel of a session
    async fn register_client(&self, session_id: SessionId, sender: PusherChannel);

    /// Drop the outbound channel of a session
    async fn unregister_client(&self, session_id: &SessionId);

    /// Deliver an event to one session
    async fn push_to(
        &self,
        session_id: &SessionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;

    /// Deliver an event to every target whose channel is still open.
    ///
    /// A failure for one target never prevents delivery to the others.
    async fn broadcast(
        &self,
        targets: &[SessionId],
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;
}
