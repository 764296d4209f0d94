use crate::domain::Clock;
use crate::interface_adapters::net::AddressedBytes;
use crate::use_cases::{AnalyticsSnapshot, GameEvent, RoomSummary};
use axum::extract::ws::Utf8Bytes;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // Inputs flowing from sessions and ingestion into the world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    // Serialized world snapshots, shared across all connections.
    pub world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Latest serialized snapshot for lag recovery.
    pub world_latest_tx: watch::Sender<Utf8Bytes>,
    // Serialized discrete events with their audience.
    pub events_bytes_tx: broadcast::Sender<AddressedBytes>,
    // Room list published by the world task.
    pub rooms_rx: watch::Receiver<Vec<RoomSummary>>,
    // Leaderboard and recent actions published by the analytics task.
    pub analytics_rx: watch::Receiver<AnalyticsSnapshot>,
    pub clock: Arc<dyn Clock>,
    // Origins accepted on WebSocket upgrades.
    pub allowed_origins: Arc<[String]>,
}
