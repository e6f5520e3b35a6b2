//! Room membership registry.
//!
//! The registry is plain data; callers serialize access to it
//! (see `usecase::RoomBroadcaster`).

use std::collections::{HashMap, HashSet};

use super::{RoomId, RoomSummary, SessionId};

/// Mapping from room to the sessions currently connected to it
///
/// Invariants:
/// - a room entry never holds the same session twice (set semantics)
/// - a room entry with no members is removed
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, HashSet<SessionId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session to a room, creating the room entry if needed.
    ///
    /// Returns `false` if the session was already a member.
    pub fn join(&mut self, room_id: RoomId, session_id: SessionId) -> bool {
        self.rooms.entry(room_id).or_default().insert(session_id)
    }

    /// Remove a session from a room, dropping the room entry once empty.
    ///
    /// Returns `false` if the room or session was absent.
    pub fn leave(&mut self, room_id: &RoomId, session_id: &SessionId) -> bool {
        let Some(members) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let removed = members.remove(session_id);
        if members.is_empty() {
            self.rooms.remove(room_id);
        }
        removed
    }

    pub fn member_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, HashSet::len)
    }

    /// Snapshot of the members of a room (empty if the room is absent)
    pub fn members(&self, room_id: &RoomId) -> Vec<SessionId> {
        self.rooms
            .get(room_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Snapshot of every active room, sorted by room id
    pub fn rooms(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> = self
            .rooms
            .iter()
            .map(|(id, members)| RoomSummary {
                id: id.clone(),
                user_count: members.len(),
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }
}
