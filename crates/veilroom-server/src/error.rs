//! HTTP boundary error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use veilroom_core::{StorageError, ValidationError};

/// Errors surfaced on the HTTP boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request failed validation before touching the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Room lookup found nothing.
    #[error("room not found")]
    RoomNotFound,

    /// The store failed; the operation was aborted with no partial write.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::RoomNotFound => StatusCode::NOT_FOUND,
            Self::Storage(err) => {
                tracing::error!(error = %err, "store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            },
        };

        (status, self.to_string()).into_response()
    }
}
