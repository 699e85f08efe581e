//! Veilroom HTTP server.
//!
//! Thin facade exposing the room store contract to remote clients. The
//! server is storage-only: it never sees a key, message bodies arrive as
//! opaque blobs and are persisted as-is, and every client converges on
//! this store's log by polling it.
//!
//! # Routes
//!
//! - `POST /rooms/{room_id}`: create (idempotent), returns the room
//! - `GET /rooms/{room_id}`: read, 404 when absent
//! - `POST /rooms/{room_id}/messages`: append, returns the new message
//! - `GET /rooms/{room_id}/messages`: full log, empty for an absent room

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use tower_http::cors::CorsLayer;
use veilroom_core::{AppendRequest, Message, Room, RoomId, RoomStore};

pub use crate::error::ApiError;

/// Shared handler state.
#[derive(Clone)]
struct AppState {
    store: Arc<dyn RoomStore>,
}

/// Build the router over any store implementation.
///
/// CORS is fully permissive: a share link must work from whatever origin
/// the presentation layer is served on.
pub fn app(store: Arc<dyn RoomStore>) -> Router {
    Router::new()
        .route("/rooms/{room_id}", post(create_room).get(get_room))
        .route("/rooms/{room_id}/messages", post(append_message).get(list_messages))
        .layer(CorsLayer::permissive())
        .with_state(AppState { store })
}

async fn create_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Room>, ApiError> {
    let room_id = RoomId::new(room_id)?;
    let room = state.store.create_room(&room_id).await?;

    tracing::info!(room = %room.id, "room created");
    Ok(Json(room))
}

async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Room>, ApiError> {
    let room_id = RoomId::new(room_id)?;

    match state.store.room(&room_id).await? {
        Some(room) => Ok(Json(room)),
        None => Err(ApiError::RoomNotFound),
    }
}

async fn append_message(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<AppendRequest>,
) -> Result<Json<Message>, ApiError> {
    let room_id = RoomId::new(room_id)?;
    let message = state
        .store
        .append_message(&room_id, &request.sender, &request.content, request.encrypted)
        .await?;

    tracing::debug!(room = %room_id, message = %message.id, "message appended");
    Ok(Json(message))
}

async fn list_messages(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let room_id = RoomId::new(room_id)?;
    Ok(Json(state.store.list_messages(&room_id).await?))
}
