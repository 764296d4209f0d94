/// Gameplay tuning for hit-scan combat and player vitals.
#[derive(Debug, Clone, Copy)]
pub struct CombatTuning {
    /// Maximum hit-scan reach along the shot direction.
    pub max_range: f32,

    /// Squared radius of the hit cylinder around the shot ray.
    pub hit_radius_sq: f32,

    /// Damage dealt by a player's shot.
    pub player_damage: i32,

    /// Damage dealt by a bot's shot.
    pub bot_damage: i32,

    /// Travel speed of the cosmetic projectile in units per second.
    pub projectile_speed: f32,

    /// Cosmetic projectile lifetime for player shots, in seconds.
    pub player_projectile_lifetime: f32,

    /// Cosmetic projectile lifetime for bot shots, in seconds.
    pub bot_projectile_lifetime: f32,

    /// Health a player spawns and respawns with.
    pub max_health: i32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            max_range: 15.0,
            hit_radius_sq: 1.0,
            player_damage: 25,
            bot_damage: 15,
            projectile_speed: 20.0,
            player_projectile_lifetime: 0.2,
            bot_projectile_lifetime: 0.1,
            max_health: 100,
        }
    }
}
