//! Per-room serialization of history access and fan-out.
//!
//! A joiner holds its room's gate from registration until its history frame
//! is queued, and a sender holds it from the history append until the live
//! frames are queued. A message is therefore either in a joiner's replay or
//! delivered to it live, never both, and the replay arrives first.
//!
//! Gates are separate from the registry lock so store latency in one room
//! never stalls joins, leaves or counts in other rooms.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::RoomId;

/// Held while a room's history and live stream must stay consistent
pub type RoomGuard = OwnedMutexGuard<()>;

#[derive(Default)]
pub struct RoomGates {
    gates: Mutex<HashMap<RoomId, Arc<Mutex<()>>>>,
}

impl RoomGates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a room.
    pub async fn enter(&self, room_id: &RoomId) -> RoomGuard {
        let gate = {
            let mut gates = self.gates.lock().await;
            gates.entry(room_id.clone()).or_default().clone()
        };
        gate.lock_owned().await
    }

    /// Forget the gate of a room nobody holds or waits on.
    pub async fn release(&self, room_id: &RoomId) {
        let mut gates = self.gates.lock().await;
        if gates
            .get(room_id)
            .is_some_and(|gate| Arc::strong_count(gate) == 1)
        {
            gates.remove(room_id);
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.gates.lock().await.len()
    }
}
