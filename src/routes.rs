use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::api::{delete_meeting, health_check, list_meetings, schedule_meeting, AppState};

pub fn create_router(app_state: Arc<AppState>, is_production: bool) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/schedule_meeting", post(schedule_meeting))
        .route("/meetings", get(list_meetings))
        .route("/meetings/", get(list_meetings));

    // Deleting bookings is a development convenience with no authorization
    if !is_production {
        router = router.route("/meetings/:meeting_id", delete(delete_meeting));
        info!("Delete route enabled - server running in development mode");
    } else {
        info!("Running in production mode - delete route disabled");
    }

    router.with_state(app_state)
}
