//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::usecase::{
    ConnectSessionUseCase, DisconnectSessionUseCase, GetHistoryUseCase, GetRoomDetailUseCase,
    GetRoomsUseCase, SendMessageUseCase,
};

use super::{
    handler::{get_room_detail, get_room_history, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Room-scoped chat relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_session_usecase,
///     disconnect_session_usecase,
///     send_message_usecase,
///     get_history_usecase,
///     get_rooms_usecase,
///     get_room_detail_usecase,
/// );
/// server.run("0.0.0.0".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `connect_session_usecase` - UseCase for joining a room
    /// * `disconnect_session_usecase` - UseCase for leaving a room
    /// * `send_message_usecase` - UseCase for relaying a chat message
    /// * `get_history_usecase` - UseCase for reading a room's history
    /// * `get_rooms_usecase` - UseCase for listing active rooms
    /// * `get_room_detail_usecase` - UseCase for one active room
    pub fn new(
        connect_session_usecase: Arc<ConnectSessionUseCase>,
        disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        get_history_usecase: Arc<GetHistoryUseCase>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                connect_session_usecase,
                disconnect_session_usecase,
                send_message_usecase,
                get_history_usecase,
                get_rooms_usecase,
                get_room_detail_usecase,
            }),
        }
    }

    /// Build the application router
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .route("/api/rooms/{room_id}/history", get(get_room_history))
            // 既存クライアント向けの旧パス
            .route("/chat/history/{place_id}", get(get_room_history))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the chat relay server until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?room=<room>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
