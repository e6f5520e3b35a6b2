//! Room membership and broadcast engine.
//!
//! `RoomBroadcaster` is the only owner of the `RoomRegistry`. Every mutation of
//! the registry, and every fan-out that depends on it, happens while holding
//! the registry lock, so occupancy counts are computed against the same state
//! that a concurrent join or leave would observe, and all members of a room see
//! broadcasts in the same order.
//!
//! History replay and message relay additionally hold the room's gate (see
//! `room_gate`) around their store access.
//!
//! Lock order: room gate, then registry, then the pusher's client map.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, MessagePushError, MessagePusher, PusherChannel, RoomEvent, RoomId, RoomRegistry,
    RoomSummary, Session, SessionId,
};

use super::room_gate::{RoomGates, RoomGuard};

pub struct RoomBroadcaster {
    registry: Mutex<RoomRegistry>,
    gates: RoomGates,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RoomBroadcaster {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry: Mutex::new(RoomRegistry::new()),
            gates: RoomGates::new(),
            message_pusher,
        }
    }

    /// Wait for exclusive access to a room's history and live stream.
    pub async fn enter_room(&self, room_id: &RoomId) -> RoomGuard {
        self.gates.enter(room_id).await
    }

    /// Register a session in its room and send the new count to every member.
    ///
    /// Returns the occupancy after the join.
    pub async fn join(&self, session: &Session, sender: PusherChannel) -> usize {
        let mut registry = self.registry.lock().await;

        self.message_pusher
            .register_client(session.id(), sender)
            .await;
        if !registry.join(session.room_id().clone(), session.id()) {
            tracing::warn!(
                "Session '{}' was already a member of room '{}'",
                session.id(),
                session.room_id()
            );
        }

        self.deliver_count(&registry, session.room_id()).await
    }

    /// Remove a session from its room and send the new count to the remaining
    /// members.
    ///
    /// Returns `None` (and broadcasts nothing) if the session was not a member.
    pub async fn leave(&self, session: &Session) -> Option<usize> {
        let mut registry = self.registry.lock().await;

        let removed = registry.leave(session.room_id(), &session.id());
        self.message_pusher.unregister_client(&session.id()).await;
        if !removed {
            return None;
        }
        if !registry.contains_room(session.room_id()) {
            self.gates.release(session.room_id()).await;
        }

        Some(self.deliver_count(&registry, session.room_id()).await)
    }

    /// Relay a message to every member of the sender's room except the sender.
    ///
    /// Returns the sessions the message was addressed to.
    pub async fn broadcast_message(&self, sender: &Session, message: ChatMessage) -> Vec<SessionId> {
        let registry = self.registry.lock().await;

        let targets: Vec<SessionId> = registry
            .members(sender.room_id())
            .into_iter()
            .filter(|id| *id != sender.id())
            .collect();

        if let Err(e) = self
            .message_pusher
            .broadcast(&targets, &RoomEvent::Message(message))
            .await
        {
            tracing::warn!(
                "Failed to broadcast message in room '{}': {}",
                sender.room_id(),
                e
            );
        }

        targets
    }

    /// Send the current occupancy to every member of a room.
    #[cfg(test)]
    pub async fn broadcast_count(&self, room_id: &RoomId) -> usize {
        let registry = self.registry.lock().await;
        self.deliver_count(&registry, room_id).await
    }

    /// Send an event to one session only.
    pub async fn push_to(&self, session: &Session, event: RoomEvent) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(&session.id(), &event).await
    }

    pub async fn member_count(&self, room_id: &RoomId) -> usize {
        self.registry.lock().await.member_count(room_id)
    }

    pub async fn members(&self, room_id: &RoomId) -> Vec<SessionId> {
        self.registry.lock().await.members(room_id)
    }

    pub async fn rooms(&self) -> Vec<RoomSummary> {
        self.registry.lock().await.rooms()
    }

    async fn deliver_count(&self, registry: &RoomRegistry, room_id: &RoomId) -> usize {
        let count = registry.member_count(room_id);
        let members = registry.members(room_id);

        tracing::info!("Users in room '{}': {}", room_id, count);

        if let Err(e) = self
            .message_pusher
            .broadcast(&members, &RoomEvent::UserCount(count))
            .await
        {
            tracing::warn!("Failed to broadcast user count in room '{}': {}", room_id, e);
        }

        count
    }
}
