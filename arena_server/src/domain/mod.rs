// Domain layer: core simulation types and rules.

pub mod errors;
pub mod math;
pub mod ports;
pub mod state;
pub mod store;
pub mod systems;
pub mod tuning;

pub use math::Vec3;
pub use ports::Clock;
pub use state::{
    Controller, GameMode, Player, PlayerId, Projectile, ProjectileKind, Room, Team, ViewerEffect,
    ViewerEffectKind,
};
pub use store::EntityStore;
