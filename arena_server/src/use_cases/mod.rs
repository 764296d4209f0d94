// Use cases layer: application workflows for the game server.

pub mod analytics;
mod bots;
mod combat;
pub mod game;
mod ingest;
mod session;
pub mod types;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

pub use analytics::{AnalyticsSnapshot, ViewerSpender, analytics_task};
pub use game::world_task;
pub use types::{
    Audience, ExternalEvent, GameEvent, MatchCreated, MatchSettled, Outbound, PurchaseMade,
    RoomSummary, ServerEvent, WorldUpdate,
};
pub use world::{World, WorldSettings};
