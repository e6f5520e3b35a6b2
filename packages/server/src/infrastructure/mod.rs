//! Infrastructure layer: concrete implementations of domain interfaces and
//! the wire formats.

pub mod dto;
pub mod history;
pub mod message_pusher;
