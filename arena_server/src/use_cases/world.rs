// The authoritative world: entity store plus round state, driven by one task.

use super::types::{Audience, ExternalEvent, GameEvent, Outbound, RoomSummary, ServerEvent, WorldUpdate};
use crate::domain::systems::effects::{EFFECT_TTL_MILLIS, expire_effects};
use crate::domain::systems::projectiles::tick_projectiles;
use crate::domain::tuning::{BotTuning, CombatTuning, RewardTuning};
use crate::domain::{Clock, EntityStore, PlayerId, Vec3};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Tunables the world is created with.
#[derive(Debug, Clone, Copy)]
pub struct WorldSettings {
    pub combat: CombatTuning,
    pub bots: BotTuning,
    pub reward: RewardTuning,
    /// Capacity for rooms created by joins or chain events.
    pub room_capacity: usize,
    /// Where joining players appear.
    pub spawn_position: Vec3,
    /// Constant world gravity reported to clients.
    pub gravity: Vec3,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            combat: CombatTuning::default(),
            bots: BotTuning::default(),
            reward: RewardTuning::default(),
            room_capacity: 8,
            spawn_position: Vec3::new(0.0, 1.0, 0.0),
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

/// Single-writer simulation state.
///
/// Every mutation goes through `handle` (inputs) or `tick` (time). Both only
/// append to an outbox; the owning task drains it and does the sending, so
/// nothing here ever waits on a client.
pub struct World {
    pub(super) store: EntityStore,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) settings: WorldSettings,
    pub(super) bot_last_shot: HashMap<PlayerId, Duration>,
    pub(super) round_number: u64,
    outbox: Vec<Outbound>,
    tick: u64,
    game_time: f64,
    next_seq: u64,
    rooms_dirty: bool,
}

impl World {
    pub fn new(settings: WorldSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: EntityStore::new(),
            clock,
            settings,
            bot_last_shot: HashMap::new(),
            round_number: 1,
            outbox: Vec::new(),
            tick: 0,
            game_time: 0.0,
            next_seq: 1,
            // Publish the initial (empty) room list once.
            rooms_dirty: true,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn round_number(&self) -> u64 {
        self.round_number
    }

    pub fn handle(&mut self, event: GameEvent) {
        match event {
            GameEvent::Join {
                session_id,
                room_id,
                player_name,
            } => self.join(&session_id, &room_id, &player_name),
            GameEvent::Leave { session_id } => self.leave(&session_id),
            GameEvent::Move {
                session_id,
                position,
                rotation,
            } => self.move_player(&session_id, position, rotation),
            GameEvent::Shoot {
                session_id,
                direction,
                projectile_type,
            } => self.shoot(&session_id, direction, &projectile_type),
            GameEvent::RequestState { session_id } => self.request_state(&session_id),
            GameEvent::External(external) => {
                let result = match external {
                    ExternalEvent::MatchCreated(event) => self.match_created(event),
                    ExternalEvent::Purchase(event) => self.purchase(event),
                    ExternalEvent::MatchSettled(event) => self.match_settled(event),
                };
                if let Err(error) = result {
                    warn!(?error, "external event dropped");
                }
            }
        }
    }

    /// Advances the simulation by one fixed step and returns the snapshot to broadcast.
    pub fn tick(&mut self, dt: f32) -> WorldUpdate {
        tick_projectiles(&mut self.store, dt);
        expire_effects(&mut self.store, self.clock.now_epoch_millis(), EFFECT_TTL_MILLIS);
        self.game_time += f64::from(dt);
        self.run_bots();
        self.tick += 1;
        self.snapshot()
    }

    pub fn snapshot(&self) -> WorldUpdate {
        WorldUpdate {
            tick: self.tick,
            players: self.store.players().cloned().collect(),
            projectiles: self.store.projectiles().cloned().collect(),
            effects: self.store.effects().cloned().collect(),
            game_time: self.game_time,
            round_number: self.round_number,
            active: self.store.player_count() > 0,
            gravity: self.settings.gravity,
            time_scale: 1.0,
        }
    }

    pub fn room_summaries(&self) -> Vec<RoomSummary> {
        self.store
            .rooms()
            .map(|room| RoomSummary {
                id: room.id.clone(),
                name: room.name.clone(),
                players: room.members.iter().cloned().collect(),
                max_players: room.max_players,
                game_mode: room.game_mode.label(),
                active: room.active,
                created_at: room.created_at,
            })
            .collect()
    }

    /// Room list if it changed since the last call.
    pub fn take_rooms_changed(&mut self) -> Option<Vec<RoomSummary>> {
        if !std::mem::take(&mut self.rooms_dirty) {
            return None;
        }
        Some(self.room_summaries())
    }

    pub fn drain_outbox(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    pub(super) fn emit(&mut self, audience: Audience, event: ServerEvent) {
        self.outbox.push(Outbound { audience, event });
    }

    /// Audience of every member of `room_id` except `except`.
    pub(super) fn room_audience(&self, room_id: &str, except: Option<&str>) -> Audience {
        let ids: Vec<PlayerId> = self
            .store
            .room_members(room_id)
            .into_iter()
            .filter(|id| Some(id.as_str()) != except)
            .collect();
        Audience::Sessions(ids.into())
    }

    pub(super) fn next_id(&mut self, prefix: &str) -> String {
        let seq = self.next_seq;
        self.next_seq += 1;
        format!("{prefix}-{seq}")
    }

    pub(super) fn mark_rooms_dirty(&mut self) {
        self.rooms_dirty = true;
    }
}
