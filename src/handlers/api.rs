use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json as ExtractJson, Path, State,
    },
    response::Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::BookingError;
use crate::models::meeting::{DeleteResponse, MeetingRequest, MeetingResponse};
use crate::services::booking::BookingService;

// AppState struct containing shared resources
pub struct AppState {
    pub booking: BookingService,
}

// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

// Schedule meeting endpoint
pub async fn schedule_meeting(
    State(state): State<Arc<AppState>>,
    payload: Result<ExtractJson<MeetingRequest>, JsonRejection>,
) -> Result<Json<MeetingResponse>, BookingError> {
    let ExtractJson(meeting_request) = payload.map_err(|rejection| {
        warn!("Rejected malformed booking request: {}", rejection.body_text());
        BookingError::InvalidRequest(rejection.body_text())
    })?;

    info!(
        "Received booking request {} - {} for {} seats",
        meeting_request.start_time, meeting_request.end_time, meeting_request.required_seats
    );

    let meeting = state.booking.schedule(meeting_request)?;
    Ok(Json(MeetingResponse::from(meeting)))
}

// List meetings endpoint
pub async fn list_meetings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MeetingResponse>>, BookingError> {
    let meetings = state.booking.list()?;
    info!("Returning {} meetings", meetings.len());

    Ok(Json(meetings.into_iter().map(MeetingResponse::from).collect()))
}

// Delete meeting endpoint, development mode only
pub async fn delete_meeting(
    State(state): State<Arc<AppState>>,
    meeting_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, BookingError> {
    let Path(meeting_id) =
        meeting_id.map_err(|rejection| BookingError::InvalidRequest(rejection.body_text()))?;

    info!("Received request to delete meeting: {}", meeting_id);

    let meeting = state.booking.delete(meeting_id)?;
    Ok(Json(DeleteResponse {
        ok: true,
        id: meeting.id,
    }))
}
