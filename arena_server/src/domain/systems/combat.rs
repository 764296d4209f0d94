// Hit-scan targeting, damage and round resolution over the entity store.

use crate::domain::math::{Vec3, ray_projection};
use crate::domain::state::{Player, PlayerId, Team};
use crate::domain::store::EntityStore;
use crate::domain::tuning::CombatTuning;

#[derive(Debug, Clone, PartialEq)]
pub enum DamageOutcome {
    Hit { remaining: i32 },
    Killed,
}

#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub winner: Option<Player>,
}

/// Picks the opposing player a shot from `shooter_id` along `direction` hits.
///
/// Candidates are living members of the shooter's room on the other team. A
/// candidate qualifies when its projection `t` onto the ray satisfies
/// `0 < t < max_range` and its squared distance to the ray is strictly below
/// the hit radius. The closest qualifying `t` wins; exact ties go to the
/// smallest player id because room members are walked in id order.
pub fn select_target(
    store: &EntityStore,
    shooter_id: &str,
    direction: Vec3,
    tuning: &CombatTuning,
) -> Option<PlayerId> {
    let shooter = store.player(shooter_id)?;
    let origin = shooter.position;

    let mut best: Option<(&str, f32)> = None;
    for candidate in store.room_players(&shooter.room_id) {
        if candidate.id == shooter.id || !candidate.alive || candidate.team == shooter.team {
            continue;
        }

        let (t, dist_sq) = ray_projection(origin, direction, candidate.position);
        if t <= 0.0 || t >= tuning.max_range {
            continue;
        }
        if dist_sq >= tuning.hit_radius_sq {
            continue;
        }

        match best {
            Some((_, best_t)) if best_t <= t => {}
            _ => best = Some((candidate.id.as_str(), t)),
        }
    }

    best.map(|(id, _)| id.to_string())
}

/// Applies clamped damage. Returns `None` when the victim is unknown or already down.
pub fn apply_damage(store: &mut EntityStore, victim_id: &str, damage: i32) -> Option<DamageOutcome> {
    let victim = store.player_mut(victim_id)?;
    if !victim.alive {
        return None;
    }

    victim.health = (victim.health - damage.max(0)).clamp(0, victim.max_health);
    if victim.health == 0 {
        victim.alive = false;
        Some(DamageOutcome::Killed)
    } else {
        Some(DamageOutcome::Hit {
            remaining: victim.health,
        })
    }
}

/// Checks whether a team in the room has been wiped out.
///
/// The winner is the living player with the smallest id on the surviving team;
/// when both teams are empty the round still ends without a winner.
pub fn round_outcome(store: &EntityStore, room_id: &str) -> Option<RoundOutcome> {
    let players = store.room_players(room_id);
    let alive_on = |team: Team| players.iter().any(|p| p.team == team && p.alive);

    let blue_alive = alive_on(Team::Blue);
    let red_alive = alive_on(Team::Red);
    if blue_alive && red_alive {
        return None;
    }

    let surviving = if blue_alive {
        Some(Team::Blue)
    } else if red_alive {
        Some(Team::Red)
    } else {
        None
    };

    let winner = surviving.and_then(|team| {
        players
            .iter()
            .find(|p| p.team == team && p.alive)
            .map(|p| (*p).clone())
    });

    Some(RoundOutcome { winner })
}

/// Full respawn in place for every player of a room.
pub fn restore_room(store: &mut EntityStore, room_id: &str) {
    for id in store.room_members(room_id) {
        if let Some(player) = store.player_mut(&id) {
            player.restore();
        }
    }
}
