// Server-driven opponents: spawn policy and per-tick behaviour.

use super::types::ServerEvent;
use super::world::World;
use crate::domain::systems::bots::{nearest_enemy, step_toward, yaw_toward};
use crate::domain::{Controller, Player, ProjectileKind, Team, Vec3};
use tracing::{debug, info};

impl World {
    /// Adds a bot to a room that has a human, too few bots and a free slot.
    pub(super) fn spawn_bot_if_needed(&mut self, room_id: &str) {
        let Some(room) = self.store.room(room_id) else {
            return;
        };
        if room.is_full() {
            return;
        }
        let members = self.store.room_players(room_id);
        let bots = members.iter().filter(|p| p.is_bot()).count();
        let humans = members.len() - bots;
        if humans == 0 || bots >= self.settings.bots.per_room {
            return;
        }

        let team = Team::for_member_count(room.members.len());
        let id = self.next_id("bot");
        let tuning = self.settings.bots;
        let bot = Player {
            id: id.clone(),
            name: "EnemyBot".to_string(),
            room_id: room_id.to_string(),
            position: tuning.spawn_position,
            rotation: Vec3::new(0.0, tuning.spawn_yaw, 0.0),
            health: self.settings.combat.max_health,
            max_health: self.settings.combat.max_health,
            team,
            alive: true,
            last_update: self.clock.now_epoch_millis(),
            controller: Controller::Bot,
        };

        self.store.upsert_player(bot.clone());
        self.store.add_member(room_id, &id);
        self.bot_last_shot.insert(id.clone(), self.clock.monotonic());
        self.mark_rooms_dirty();

        info!(bot_id = %id, room_id, team = ?team, "bot spawned");
        let audience = self.room_audience(room_id, None);
        self.emit(audience, ServerEvent::PlayerJoined(bot));
    }

    /// Drops every bot of a room once no human is left in it.
    pub(super) fn remove_unattended_bots(&mut self, room_id: &str) {
        let members = self.store.room_players(room_id);
        if members.iter().any(|p| !p.is_bot()) {
            return;
        }
        let bot_ids: Vec<String> = members.iter().map(|p| p.id.clone()).collect();
        for bot_id in bot_ids {
            info!(%bot_id, room_id, "removing unattended bot");
            self.leave(&bot_id);
        }
    }

    /// Moves, aims and fires every living bot.
    pub(super) fn run_bots(&mut self) {
        let now = self.clock.monotonic();
        let tuning = self.settings.bots;
        let combat = self.settings.combat;

        for bot_id in self.store.player_ids() {
            let Some(bot) = self.store.player(&bot_id) else {
                continue;
            };
            if !bot.is_bot() || !bot.alive {
                continue;
            }
            let Some(target) = nearest_enemy(&self.store, bot).map(|p| p.position) else {
                continue;
            };

            let position = step_toward(bot.position, target, tuning.step);
            let yaw = yaw_toward(position, target);
            if let Some(bot) = self.store.player_mut(&bot_id) {
                bot.position = position;
                bot.rotation.y = yaw;
            }

            let last_shot = self.bot_last_shot.get(&bot_id).copied().unwrap_or_default();
            if now.saturating_sub(last_shot) <= tuning.shot_interval {
                continue;
            }
            self.bot_last_shot.insert(bot_id.clone(), now);
            debug!(%bot_id, yaw, "bot firing");
            self.fire(
                &bot_id,
                Vec3::forward_from_yaw(yaw),
                ProjectileKind::Bullet,
                combat.bot_damage,
                combat.bot_projectile_lifetime,
            );
        }
    }
}
