//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::{
        http::{HealthDto, RoomSummaryDto},
        websocket::ChatMessageDto,
    },
    ui::state::AppState,
    usecase::{GetHistoryError, GetRoomDetailError},
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Get list of active rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.into_iter().map(RoomSummaryDto::from).collect())
}

/// Get one active room by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSummaryDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::NOT_FOUND)?;

    match state.get_room_detail_usecase.execute(room_id).await {
        Ok(room) => Ok(Json(RoomSummaryDto::from(room))),
        Err(GetRoomDetailError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
    }
}

/// Get the stored history of a room, newest first
pub async fn get_room_history(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<ChatMessageDto>>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::NOT_FOUND)?;

    match state.get_history_usecase.execute(room_id).await {
        Ok(messages) => Ok(Json(
            messages.into_iter().map(ChatMessageDto::from).collect(),
        )),
        Err(GetHistoryError::StoreUnavailable(e)) => {
            tracing::warn!("History endpoint failed: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
