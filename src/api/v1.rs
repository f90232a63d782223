use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    api::{health, leads, roi, twin},
    controller::AppState,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/twin", get(twin::get_snapshot))
        .route("/twin/rooms/:id", get(twin::get_room))
        .route("/twin/step", post(twin::step))
        .route("/twin/stream", get(twin::stream))
        .route("/roi", get(roi::get_projection))
        .route("/roi/reveal", get(roi::get_reveal))
        .route("/roi/reveal/stream", get(roi::stream_reveal))
        .route("/leads", post(leads::capture_lead))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .with_state(state)
}
