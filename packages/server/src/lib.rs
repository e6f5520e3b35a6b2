//! Room-scoped WebSocket chat relay.
//!
//! Clients join a room over WebSocket, receive the room's recent history,
//! and exchange messages with the other members. Occupancy counts are pushed
//! on every join and leave.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
