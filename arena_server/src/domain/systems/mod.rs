pub mod bots;
pub mod combat;
pub mod effects;
pub mod projectiles;
