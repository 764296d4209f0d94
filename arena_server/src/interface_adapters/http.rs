// Shared HTTP response types plus the read-only JSON endpoints.

use crate::interface_adapters::protocol::{RoomDto, ViewerEffectDto, ViewerSpenderDto};
use crate::interface_adapters::state::AppState;
use axum::{Json, extract::State};
use std::sync::Arc;

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    // Human-readable error string for consistent JSON error responses.
    pub error: String,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    // Epoch millis.
    pub timestamp: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: state.clock.now_epoch_millis(),
    })
}

pub async fn rooms_handler(State(state): State<Arc<AppState>>) -> Json<Vec<RoomDto>> {
    // Clone out of the watch so the borrow is not held while serializing.
    let rooms = state.rooms_rx.borrow().clone();
    Json(rooms.iter().map(RoomDto::from).collect())
}

pub async fn leaderboard_handler(State(state): State<Arc<AppState>>) -> Json<Vec<ViewerSpenderDto>> {
    let snapshot = state.analytics_rx.borrow().clone();
    Json(snapshot.leaderboard.iter().map(ViewerSpenderDto::from).collect())
}

pub async fn recent_actions_handler(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<ViewerEffectDto>> {
    let snapshot = state.analytics_rx.borrow().clone();
    Json(
        snapshot
            .recent_actions
            .iter()
            .map(ViewerEffectDto::from)
            .collect(),
    )
}
