//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{RoomId, Session},
    infrastructure::dto::websocket::ClientFrame,
    ui::state::AppState,
    usecase::DisconnectError,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(alias = "placeId")]
    pub room: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert String -> RoomId (Domain Model)
    let room_id = match query.room.map(RoomId::new) {
        Some(Ok(room_id)) => room_id,
        Some(Err(_)) | None => {
            tracing::warn!("Rejecting WebSocket connection without a room id");
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room_id)))
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound flow: frames produced for this session
/// (history, relayed messages, counts) are written to its WebSocket connection.
///
/// # Arguments
///
/// * `rx` - Channel receiver for frames addressed to this session
/// * `sender` - WebSocket sink to send frames to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
        // 送信できなくなったら close を試みる
        let _ = sender.close().await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, room_id: RoomId) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this session to receive frames
    let (tx, rx) = mpsc::unbounded_channel();

    // Join the room (user_count broadcast + history replay)
    let mut session = match state.connect_session_usecase.execute(room_id, tx).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Failed to connect session: {}", e);
            return;
        }
    };

    let mut send_task = pusher_loop(rx, sender);

    // どちらかが終了したらセッションを閉じる
    tokio::select! {
        _ = receive_loop(&mut receiver, &state, &mut session) => {}
        _ = &mut send_task => {
            tracing::debug!("Outbound stream of session '{}' ended", session.id());
        }
    }
    send_task.abort();

    match state.disconnect_session_usecase.execute(&mut session).await {
        Ok(_) => {}
        Err(DisconnectError::AlreadyDisconnected) => {
            tracing::debug!("Session '{}' was already disconnected", session.id());
        }
        Err(e) => {
            tracing::warn!("Failed to disconnect session '{}': {}", session.id(), e);
        }
    }
}

/// Reads frames from the client until it closes the connection
async fn receive_loop(
    receiver: &mut SplitStream<WebSocket>,
    state: &AppState,
    session: &mut Session,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket error on session '{}': {}", session.id(), e);
                break;
            }
        };

        match msg {
            Message::Text(text) => handle_text(state, session, text.as_str()).await,
            Message::Close(_) => {
                tracing::info!("Session '{}' requested close", session.id());
                break;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            _ => {}
        }
    }
}

async fn handle_text(state: &AppState, session: &mut Session, text: &str) {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(
                "Dropping malformed frame from session '{}': {}",
                session.id(),
                e
            );
            return;
        }
    };

    match frame {
        ClientFrame::Message { chat_message } => {
            if let Err(e) = state
                .send_message_usecase
                .execute(session, chat_message)
                .await
            {
                tracing::warn!("Failed to send message: {}", e);
            }
        }
        ClientFrame::Unsupported => {
            tracing::debug!("Ignoring unsupported frame from session '{}'", session.id());
        }
    }
}
