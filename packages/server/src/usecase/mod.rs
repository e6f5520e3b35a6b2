//! UseCase layer.
//!
//! Application logic of the chat relay, built on the domain layer.

pub mod connect_session;
pub mod disconnect_session;
pub mod error;
pub mod get_history;
pub mod get_room_detail;
pub mod get_rooms;
pub mod room_broadcaster;
pub mod room_gate;
pub mod send_message;

pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{
    ConnectError, DisconnectError, GetHistoryError, GetRoomDetailError, SendMessageError,
};
pub use get_history::GetHistoryUseCase;
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use room_broadcaster::RoomBroadcaster;
pub use send_message::SendMessageUseCase;
