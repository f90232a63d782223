use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};
use validator::Validate;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    controller::AppState,
    domain::Room,
    simulation::TwinSnapshot,
};

/// GET /api/v1/twin - Latest published snapshot
pub async fn get_snapshot(State(state): State<AppState>) -> Json<ApiResponse<TwinSnapshot>> {
    let snapshot = state.twin.latest();
    let count = snapshot.rooms.len();
    Json(
        ApiResponse::success(TwinSnapshot::clone(&snapshot))
            .with_count(count)
            .with_tick(snapshot.tick),
    )
}

/// GET /api/v1/twin/rooms/:id - One room from the latest snapshot
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Room>>, ApiError> {
    let snapshot = state.twin.latest();
    let room = snapshot
        .room(&id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("room '{id}'")))?;
    Ok(Json(ApiResponse::success(room).with_tick(snapshot.tick)))
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize, Validate)]
pub struct StepRequest {
    #[serde(default = "one")]
    #[validate(range(min = 1, max = 100))]
    pub steps: u32,
}

/// POST /api/v1/twin/step - Advance the simulation outside the timer
pub async fn step(
    State(state): State<AppState>,
    payload: Result<Json<StepRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TwinSnapshot>>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;
    let snapshot = state.twin.advance(req.steps);
    debug!(steps = req.steps, tick = snapshot.tick, "manual twin step");
    Ok(Json(
        ApiResponse::success(TwinSnapshot::clone(&snapshot)).with_tick(snapshot.tick),
    ))
}

/// GET /api/v1/twin/stream - WebSocket feed, one JSON snapshot per tick
pub async fn stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.twin.subscribe();
    ws.on_upgrade(move |socket| push_snapshots(socket, rx))
}

async fn send_snapshot(socket: &mut WebSocket, snapshot: &TwinSnapshot) -> bool {
    match serde_json::to_string(snapshot) {
        Ok(text) => socket.send(Message::Text(text)).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "snapshot serialization failed");
            false
        }
    }
}

async fn push_snapshots(mut socket: WebSocket, mut rx: watch::Receiver<Arc<TwinSnapshot>>) {
    let current = rx.borrow_and_update().clone();
    if !send_snapshot(&mut socket, &current).await {
        return;
    }

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                if !send_snapshot(&mut socket, &snapshot).await {
                    break;
                }
            }
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }
    debug!("twin stream closed");
}
