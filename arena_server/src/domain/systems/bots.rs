use crate::domain::math::{Vec3, step_sign};
use crate::domain::state::Player;
use crate::domain::store::EntityStore;

/// Nearest living enemy of `bot` in its room by planar (x, z) distance.
///
/// Ties keep the first candidate in id order.
pub fn nearest_enemy<'a>(store: &'a EntityStore, bot: &Player) -> Option<&'a Player> {
    let mut best: Option<(&Player, f32)> = None;
    for other in store.room_players(&bot.room_id) {
        if other.team == bot.team || !other.alive {
            continue;
        }
        let d2 = bot.position.planar_distance_sq(other.position);
        match best {
            Some((_, best_d2)) if best_d2 <= d2 => {}
            _ => best = Some((other, d2)),
        }
    }
    best.map(|(player, _)| player)
}

/// Moves `step` along x and z independently toward `target`.
///
/// Axes are not normalized together, so a diagonal approach covers
/// `step * sqrt(2)` per tick. Height is left untouched.
pub fn step_toward(from: Vec3, target: Vec3, step: f32) -> Vec3 {
    Vec3::new(
        from.x + step_sign(target.x - from.x) * step,
        from.y,
        from.z + step_sign(target.z - from.z) * step,
    )
}

/// Yaw that faces `target` from `from` with +z as forward.
pub fn yaw_toward(from: Vec3, target: Vec3) -> f32 {
    (target.x - from.x).atan2(target.z - from.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::{Controller, Room, Team};
    use std::f32::consts::FRAC_PI_2;

    fn add(store: &mut EntityStore, id: &str, team: Team, position: Vec3, alive: bool) {
        store.upsert_player(Player {
            id: id.to_string(),
            name: id.to_string(),
            room_id: "arena".to_string(),
            position,
            rotation: Vec3::ZERO,
            health: if alive { 100 } else { 0 },
            max_health: 100,
            team,
            alive,
            last_update: 0,
            controller: if id.starts_with("bot") { Controller::Bot } else { Controller::Human },
        });
        if store.room("arena").is_none() {
            store.insert_room(Room::new("arena", "Room arena", 8, 0));
        }
        if let Some(room) = store.room_mut("arena") {
            room.members.insert(id.to_string());
        }
    }

    #[test]
    fn when_enemies_are_spread_then_nearest_living_one_is_chosen() {
        let mut store = EntityStore::new();
        add(&mut store, "bot", Team::Red, Vec3::ZERO, true);
        add(&mut store, "close-but-dead", Team::Blue, Vec3::new(1.0, 0.0, 0.0), false);
        add(&mut store, "far", Team::Blue, Vec3::new(8.0, 0.0, 8.0), true);
        add(&mut store, "mid", Team::Blue, Vec3::new(3.0, 50.0, 0.0), true);

        let bot = store.player("bot").expect("bot").clone();
        let target = nearest_enemy(&store, &bot).map(|p| p.id.clone());

        // Height is ignored for target acquisition.
        assert_eq!(target.as_deref(), Some("mid"));
    }

    #[test]
    fn when_only_teammates_remain_then_no_target() {
        let mut store = EntityStore::new();
        add(&mut store, "bot", Team::Red, Vec3::ZERO, true);
        add(&mut store, "mate", Team::Red, Vec3::new(1.0, 0.0, 0.0), true);

        let bot = store.player("bot").expect("bot").clone();
        assert!(nearest_enemy(&store, &bot).is_none());
    }

    #[test]
    fn when_target_is_diagonal_then_both_axes_step_fully() {
        let next = step_toward(Vec3::new(0.0, 1.0, 0.0), Vec3::new(4.0, 1.0, -4.0), 0.05);

        assert_eq!(next, Vec3::new(0.05, 1.0, -0.05));
        let moved = (next - Vec3::new(0.0, 1.0, 0.0)).length_sq().sqrt();
        assert!(moved > 0.05 * 1.41);
    }

    #[test]
    fn when_target_shares_an_axis_then_that_axis_does_not_move() {
        let next = step_toward(Vec3::new(2.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 5.0), 0.05);
        assert_eq!(next, Vec3::new(2.0, 1.0, 0.05));
    }

    #[test]
    fn when_target_is_to_the_right_then_yaw_is_quarter_turn() {
        let yaw = yaw_toward(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0));
        assert!((yaw - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(yaw_toward(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0)), 0.0);
    }
}
