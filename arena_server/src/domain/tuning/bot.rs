use crate::domain::math::Vec3;
use std::f32::consts::PI;
use std::time::Duration;

/// Gameplay tuning for server-driven bots.
#[derive(Debug, Clone, Copy)]
pub struct BotTuning {
    /// Per-axis step toward the target each tick.
    pub step: f32,

    /// Minimum time between two shots of the same bot.
    pub shot_interval: Duration,

    /// Where a freshly spawned bot appears.
    pub spawn_position: Vec3,

    /// Initial yaw; PI faces the room origin from the spawn point.
    pub spawn_yaw: f32,

    /// Bots kept per room while at least one human is present.
    pub per_room: usize,
}

impl Default for BotTuning {
    fn default() -> Self {
        Self {
            step: 0.05,
            shot_interval: Duration::from_millis(600),
            spawn_position: Vec3::new(5.0, 1.0, 0.0),
            spawn_yaw: PI,
            per_room: 1,
        }
    }
}
