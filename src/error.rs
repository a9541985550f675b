//! Booking error types.
//!
//! Every variant maps to an HTTP status and a `{"detail": ...}` body through
//! the `IntoResponse` impl. Store failures are logged server-side and reported
//! to the client with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::store::StoreError;

/// Reasons a booking request (or an administrative operation) fails.
///
/// - InsufficientCapacity, OverlapConflict: 400 Bad Request
/// - NotFound: 404 Not Found
/// - InvalidRequest: 422 Unprocessable Entity
/// - Store: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("The conference room does not have enough seats!")]
    InsufficientCapacity,

    #[error("Meeting overlaps with an existing meeting")]
    OverlapConflict,

    #[error("Meeting {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookingError::InsufficientCapacity | BookingError::OverlapConflict => {
                StatusCode::BAD_REQUEST
            }
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Error body shared by every failing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let detail = match &self {
            BookingError::Store(err) => {
                tracing::error!(error = %err, "Meeting store operation failed");
                "An internal storage error occurred".to_string()
            }
            other => other.to_string(),
        };

        (self.status_code(), Json(ErrorResponse { detail })).into_response()
    }
}
