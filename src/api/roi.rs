use axum::{
    extract::{
        rejection::QueryRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    controller::AppState,
    domain::{BillBreakdown, CostComparison},
    simulation::{play, RevealFrame, RevealSchedule},
};

#[derive(Debug, Deserialize)]
pub struct RoiQuery {
    pub monthly_bill: u32,
}

#[derive(Debug, Serialize)]
pub struct RoiResult {
    pub monthly_bill: u32,
    pub breakdown: BillBreakdown,
    pub comparison: CostComparison,
}

#[derive(Debug, Serialize)]
pub struct RevealResponse {
    pub target: f64,
    pub steps: u32,
    pub duration_ms: u64,
    pub frames: Vec<RevealFrame>,
}

/// Only values the bill slider can produce are accepted here.
fn checked_bill(
    state: &AppState,
    query: Result<Query<RoiQuery>, QueryRejection>,
) -> Result<u32, ApiError> {
    let Query(q) = query?;
    let roi = &state.cfg.roi;
    if !roi.accepts_bill(q.monthly_bill) {
        return Err(ApiError::ValidationError(format!(
            "monthly_bill must be between {} and {} in steps of {}",
            roi.min_bill, roi.max_bill, roi.bill_step
        )));
    }
    Ok(q.monthly_bill)
}

/// GET /api/v1/roi?monthly_bill= - Cost and savings breakdown
pub async fn get_projection(
    State(state): State<AppState>,
    query: Result<Query<RoiQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<RoiResult>>, ApiError> {
    let monthly_bill = checked_bill(&state, query)?;
    let bill = f64::from(monthly_bill);
    let breakdown = state.roi.project(bill);
    Ok(Json(ApiResponse::success(RoiResult {
        monthly_bill,
        breakdown,
        comparison: breakdown.comparison(bill),
    })))
}

/// GET /api/v1/roi/reveal?monthly_bill= - Count-up frames for the annual savings
pub async fn get_reveal(
    State(state): State<AppState>,
    query: Result<Query<RoiQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<RevealResponse>>, ApiError> {
    let bill = checked_bill(&state, query)?;
    let target = state.roi.project(f64::from(bill)).annual_savings;
    let schedule = state.reveal;
    let frames = schedule.frames(target);
    let count = frames.len();
    Ok(Json(
        ApiResponse::success(RevealResponse {
            target,
            steps: schedule.steps(),
            duration_ms: schedule.duration().as_millis() as u64,
            frames,
        })
        .with_count(count),
    ))
}

/// GET /api/v1/roi/reveal/stream?monthly_bill= - Plays the count-up over a WebSocket
pub async fn stream_reveal(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    query: Result<Query<RoiQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let bill = checked_bill(&state, query)?;
    let target = state.roi.project(f64::from(bill)).annual_savings;
    let schedule = state.reveal;
    Ok(ws.on_upgrade(move |socket| push_reveal(socket, schedule, target)))
}

async fn push_reveal(mut socket: WebSocket, schedule: RevealSchedule, target: f64) {
    let (tx, mut rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let player = tokio::spawn(play(
        schedule.frames(target),
        schedule.period(),
        tx,
        cancel.clone(),
    ));

    while let Some(frame) = rx.recv().await {
        let Ok(text) = serde_json::to_string(&frame) else {
            break;
        };
        if socket.send(Message::Text(text)).await.is_err() {
            break;
        }
    }

    cancel.cancel();
    drop(rx);
    let delivered = player.await.unwrap_or_default();
    debug!(delivered, target, "reveal stream closed");
}
