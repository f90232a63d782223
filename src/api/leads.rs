use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    api::{error::ApiError, response::ApiResponse},
    controller::AppState,
    leads::{CaptureOutcome, LeadRequest},
};

/// POST /api/v1/leads - Capture an email and return the savings results
///
/// Returns 400 for a malformed body or email without contacting the database. A failed
/// insert still returns 200 with `persisted: false` and a warning notice.
pub async fn capture_lead(
    State(state): State<AppState>,
    payload: Result<Json<LeadRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CaptureOutcome>>, ApiError> {
    let Json(req) = payload?;
    let outcome = state.leads.capture(req).await?;
    Ok(Json(ApiResponse::success(outcome)))
}
