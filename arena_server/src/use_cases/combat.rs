// Shot resolution: cosmetic projectile, hit-scan, damage and round end.

use super::types::{Audience, ServerEvent};
use super::world::World;
use crate::domain::systems::combat::{
    DamageOutcome, apply_damage, restore_room, round_outcome, select_target,
};
use crate::domain::{Projectile, ProjectileKind, Vec3};
use tracing::{debug, info};

impl World {
    /// Resolves one shot from `shooter_id`. Shared by players and bots.
    pub(super) fn fire(
        &mut self,
        shooter_id: &str,
        direction: Vec3,
        kind: ProjectileKind,
        damage: i32,
        lifetime: f32,
    ) {
        let Some(shooter) = self.store.player(shooter_id) else {
            return;
        };
        let room_id = shooter.room_id.clone();
        let origin = shooter.position;

        let projectile = Projectile {
            id: self.next_id("projectile"),
            position: origin,
            direction,
            speed: self.settings.combat.projectile_speed,
            damage,
            owner_id: shooter_id.to_string(),
            kind,
            lifetime,
        };
        self.store.insert_projectile(projectile.clone());
        let audience = self.room_audience(&room_id, None);
        self.emit(audience, ServerEvent::ProjectileCreated(projectile));

        let Some(victim_id) = select_target(&self.store, shooter_id, direction, &self.settings.combat)
        else {
            return;
        };
        self.apply_damage_from(shooter_id, &victim_id, damage);
    }

    fn apply_damage_from(&mut self, attacker_id: &str, victim_id: &str, damage: i32) {
        match apply_damage(&mut self.store, victim_id, damage) {
            Some(DamageOutcome::Hit { remaining }) => {
                debug!(attacker_id, victim_id, damage, remaining, "player hit");
                self.emit(
                    Audience::All,
                    ServerEvent::PlayerHit {
                        player_id: victim_id.to_string(),
                        damage,
                        attacker_id: attacker_id.to_string(),
                    },
                );
            }
            Some(DamageOutcome::Killed) => {
                info!(attacker_id, victim_id, "player died");
                self.emit(
                    Audience::All,
                    ServerEvent::PlayerDied {
                        player_id: victim_id.to_string(),
                        killer_id: attacker_id.to_string(),
                    },
                );
                if let Some(room_id) = self.store.player(victim_id).map(|p| p.room_id.clone()) {
                    self.check_round_end(&room_id);
                }
            }
            None => {}
        }
    }

    fn check_round_end(&mut self, room_id: &str) {
        let Some(outcome) = round_outcome(&self.store, room_id) else {
            return;
        };

        let reward_lamports = self.settings.reward.for_round(self.round_number);
        info!(
            room_id,
            round = self.round_number,
            winner = outcome.winner.as_ref().map(|p| p.id.as_str()),
            reward_lamports,
            "round ended"
        );
        self.emit(
            Audience::All,
            ServerEvent::RoundEnd {
                winner: outcome.winner,
                reward_lamports,
            },
        );

        self.round_number += 1;
        restore_room(&mut self.store, room_id);
    }
}
