// Session gateway: connection-driven operations on the world.

use super::types::{Audience, ServerEvent};
use super::world::World;
use crate::domain::errors::JoinError;
use crate::domain::{Controller, Player, ProjectileKind, Room, Team, Vec3};
use tracing::{debug, info};

impl World {
    /// Puts a session into a room, creating the room on first use.
    ///
    /// Capacity is checked before anything changes: a rejected join leaves the
    /// session where it was and only tells that session. An accepted join
    /// moves a session that is already in a room out of it first.
    pub fn join(&mut self, session_id: &str, room_id: &str, player_name: &str) {
        let (occupied, capacity) = match self.store.room(room_id) {
            Some(room) => {
                let own_seat = usize::from(room.members.contains(session_id));
                (room.members.len() - own_seat, room.max_players)
            }
            None => (0, self.settings.room_capacity),
        };
        if occupied >= capacity {
            info!(room_id, session_id, "join rejected; room full");
            self.emit(
                Audience::Session(session_id.to_string()),
                ServerEvent::JoinRejected {
                    room_id: room_id.to_string(),
                    reason: JoinError::RoomFull,
                },
            );
            return;
        }

        if self.store.player(session_id).is_some() {
            self.leave(session_id);
        }

        let now = self.clock.now_epoch_millis();
        if self.store.room(room_id).is_none() {
            self.store.insert_room(Room::new(
                room_id,
                format!("Room {room_id}"),
                self.settings.room_capacity,
                now,
            ));
            self.mark_rooms_dirty();
            info!(room_id, "room created");
        }

        let Some(room) = self.store.room(room_id) else {
            return;
        };
        let player = Player {
            id: session_id.to_string(),
            name: player_name.to_string(),
            room_id: room_id.to_string(),
            position: self.settings.spawn_position,
            rotation: Vec3::ZERO,
            health: self.settings.combat.max_health,
            max_health: self.settings.combat.max_health,
            team: Team::for_member_count(room.members.len()),
            alive: true,
            last_update: now,
            controller: Controller::Human,
        };

        let audience = self.room_audience(room_id, None);
        self.store.upsert_player(player.clone());
        self.store.add_member(room_id, session_id);
        self.mark_rooms_dirty();

        info!(session_id, room_id, team = ?player.team, name = %player.name, "player joined");
        self.emit(audience, ServerEvent::PlayerJoined(player));
        self.emit(
            Audience::Session(session_id.to_string()),
            ServerEvent::GameState(self.snapshot()),
        );

        self.spawn_bot_if_needed(room_id);
    }

    /// Removes a session's player. Unknown sessions are ignored.
    pub fn leave(&mut self, session_id: &str) {
        let Some(player) = self.store.remove_player(session_id) else {
            return;
        };
        self.bot_last_shot.remove(session_id);
        self.store.remove_member(&player.room_id, session_id);
        self.mark_rooms_dirty();

        info!(session_id, room_id = %player.room_id, "player left");
        let audience = self.room_audience(&player.room_id, None);
        self.emit(
            audience,
            ServerEvent::PlayerLeft {
                player_id: player.id.clone(),
            },
        );

        if !player.is_bot() {
            self.remove_unattended_bots(&player.room_id);
        }
        self.drop_room_if_abandoned(&player.room_id);
    }

    fn drop_room_if_abandoned(&mut self, room_id: &str) {
        if self.store.room(room_id).is_some_and(|room| room.is_abandoned()) {
            self.store.remove_room(room_id);
            self.mark_rooms_dirty();
            debug!(room_id, "empty room dropped");
        }
    }

    /// Overwrites a player's pose and relays it to the rest of the room.
    pub fn move_player(&mut self, session_id: &str, position: Vec3, rotation: Vec3) {
        let now = self.clock.now_epoch_millis();
        let Some(player) = self.store.player_mut(session_id) else {
            return;
        };
        player.position = position;
        player.rotation = rotation;
        player.last_update = now;
        let player = player.clone();

        let audience = self.room_audience(&player.room_id, Some(session_id));
        self.emit(audience, ServerEvent::PlayerMove(player));
    }

    /// Fires for a living player. Dead or unknown shooters are ignored.
    pub fn shoot(&mut self, session_id: &str, direction: Vec3, projectile_type: &str) {
        match self.store.player(session_id) {
            Some(player) if player.alive => {}
            _ => {
                debug!(session_id, "shot ignored; no living player");
                return;
            }
        }

        let combat = self.settings.combat;
        self.fire(
            session_id,
            direction,
            ProjectileKind::from_label(projectile_type),
            combat.player_damage,
            combat.player_projectile_lifetime,
        );
    }

    pub fn request_state(&mut self, session_id: &str) {
        self.emit(
            Audience::Session(session_id.to_string()),
            ServerEvent::GameState(self.snapshot()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Clock;
    use crate::use_cases::test_support::{
        ManualClock, events, settings_without_bots, world_with, world_with_settings,
    };
    use crate::use_cases::types::{GameEvent, MatchCreated};
    use std::time::Duration;

    fn join(world: &mut World, session_id: &str, room_id: &str) {
        world.handle(GameEvent::Join {
            session_id: session_id.to_string(),
            room_id: room_id.to_string(),
            player_name: format!("name-{session_id}"),
        });
    }

    #[test]
    fn when_players_join_fresh_room_then_teams_alternate() {
        let (mut world, _clock) = world_with_settings(settings_without_bots(), ManualClock::new());

        join(&mut world, "p1", "arena");
        join(&mut world, "p2", "arena");
        join(&mut world, "p3", "arena");

        let team = |id: &str| world.store().player(id).map(|p| p.team);
        assert_eq!(team("p1"), Some(Team::Blue));
        assert_eq!(team("p2"), Some(Team::Red));
        assert_eq!(team("p3"), Some(Team::Blue));
    }

    #[test]
    fn when_player_joins_then_peers_are_told_and_joiner_gets_snapshot() {
        let (mut world, _clock) = world_with_settings(settings_without_bots(), ManualClock::new());
        join(&mut world, "p1", "arena");
        world.drain_outbox();

        join(&mut world, "p2", "arena");
        let outbox = world.drain_outbox();

        let joined = outbox
            .iter()
            .find(|out| matches!(&out.event, ServerEvent::PlayerJoined(p) if p.id == "p2"))
            .expect("playerJoined should be emitted");
        assert!(joined.audience.includes("p1"));
        assert!(!joined.audience.includes("p2"));

        let snapshot = outbox
            .iter()
            .find(|out| matches!(out.event, ServerEvent::GameState(_)))
            .expect("joiner should get a snapshot");
        assert_eq!(snapshot.audience, Audience::Session("p2".to_string()));
        match &snapshot.event {
            ServerEvent::GameState(update) => assert_eq!(update.players.len(), 2),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn when_player_spawns_then_it_has_full_health_at_spawn_point() {
        let (mut world, _clock) = world_with_settings(settings_without_bots(), ManualClock::new());
        join(&mut world, "p1", "arena");

        let player = world.store().player("p1").expect("player");
        assert_eq!(player.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!((player.health, player.max_health), (100, 100));
        assert!(player.alive);
        assert_eq!(player.name, "name-p1");
        assert_eq!(player.controller, Controller::Human);
    }

    #[test]
    fn when_room_is_full_then_join_is_rejected_for_that_session_only() {
        let mut settings = settings_without_bots();
        settings.room_capacity = 2;
        let (mut world, _clock) = world_with_settings(settings, ManualClock::new());
        join(&mut world, "p1", "arena");
        join(&mut world, "p2", "arena");
        world.drain_outbox();

        join(&mut world, "p3", "arena");
        let outbox = world.drain_outbox();

        assert!(world.store().player("p3").is_none());
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].audience, Audience::Session("p3".to_string()));
        assert!(matches!(
            outbox[0].event,
            ServerEvent::JoinRejected {
                reason: JoinError::RoomFull,
                ..
            }
        ));
    }

    #[test]
    fn when_player_rejoins_elsewhere_then_previous_room_is_left() {
        let (mut world, _clock) = world_with_settings(settings_without_bots(), ManualClock::new());
        join(&mut world, "p1", "arena");
        join(&mut world, "p2", "arena");
        join(&mut world, "p1", "other");

        let arena = world.store().room("arena").expect("room still has p2");
        assert!(!arena.members.contains("p1"));
        assert_eq!(
            world.store().player("p1").map(|p| p.room_id.as_str()),
            Some("other")
        );
    }

    #[test]
    fn when_leaving_twice_or_without_joining_then_nothing_happens() {
        let (mut world, _clock) = world_with_settings(settings_without_bots(), ManualClock::new());
        world.handle(GameEvent::Leave {
            session_id: "ghost".to_string(),
        });
        assert!(world.drain_outbox().is_empty());

        join(&mut world, "p1", "arena");
        join(&mut world, "p2", "arena");
        world.drain_outbox();
        world.leave("p1");
        let outbox = world.drain_outbox();
        assert!(matches!(
            events(&outbox).as_slice(),
            [ServerEvent::PlayerLeft { player_id }] if player_id == "p1"
        ));
        assert!(outbox[0].audience.includes("p2"));

        world.leave("p1");
        assert!(world.drain_outbox().is_empty());
    }

    #[test]
    fn when_unknown_session_moves_then_it_is_ignored() {
        let (mut world, _clock) = world_with_settings(settings_without_bots(), ManualClock::new());
        world.move_player("ghost", Vec3::new(1.0, 1.0, 1.0), Vec3::ZERO);
        assert!(world.drain_outbox().is_empty());
        assert_eq!(world.store().player_count(), 0);
    }

    #[test]
    fn when_player_moves_then_pose_is_stored_and_relayed_to_peers_only() {
        let (mut world, clock) = world_with_settings(settings_without_bots(), ManualClock::new());
        join(&mut world, "p1", "arena");
        join(&mut world, "p2", "arena");
        join(&mut world, "elsewhere", "other");
        world.drain_outbox();
        clock.advance(Duration::from_millis(250));

        world.move_player("p1", Vec3::new(3.0, 1.0, -2.0), Vec3::new(0.0, 1.5, 0.0));

        let player = world.store().player("p1").expect("player");
        assert_eq!(player.position, Vec3::new(3.0, 1.0, -2.0));
        assert_eq!(player.rotation.y, 1.5);
        assert_eq!(player.last_update, clock.now_epoch_millis());

        let outbox = world.drain_outbox();
        assert_eq!(outbox.len(), 1);
        assert!(outbox[0].audience.includes("p2"));
        assert!(!outbox[0].audience.includes("p1"));
        assert!(!outbox[0].audience.includes("elsewhere"));
    }

    #[test]
    fn when_dead_player_shoots_then_nothing_is_created() {
        let (mut world, _clock) = world_with_settings(settings_without_bots(), ManualClock::new());
        join(&mut world, "p1", "arena");
        if let Some(p) = world.store.player_mut("p1") {
            p.health = 0;
            p.alive = false;
        }
        world.drain_outbox();

        world.shoot("p1", Vec3::new(0.0, 0.0, 1.0), "bullet");

        assert!(world.drain_outbox().is_empty());
        assert_eq!(world.store().projectiles().count(), 0);
    }

    #[test]
    fn when_state_is_requested_then_only_requester_gets_snapshot() {
        let (mut world, _clock) = world_with(ManualClock::new());
        world.request_state("p9");

        let outbox = world.drain_outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].audience, Audience::Session("p9".to_string()));
        assert!(matches!(outbox[0].event, ServerEvent::GameState(_)));
    }

    #[test]
    fn when_rejoin_targets_full_room_then_current_room_is_kept() {
        let mut settings = settings_without_bots();
        settings.room_capacity = 1;
        let (mut world, _clock) = world_with_settings(settings, ManualClock::new());
        join(&mut world, "p1", "a");
        join(&mut world, "p2", "b");
        world.drain_outbox();

        join(&mut world, "p1", "b");

        assert_eq!(
            world.store().player("p1").map(|p| p.room_id.as_str()),
            Some("a")
        );
        assert!(world.store().room("a").is_some_and(|r| r.members.contains("p1")));
        let outbox = world.drain_outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].audience, Audience::Session("p1".to_string()));
        assert!(matches!(outbox[0].event, ServerEvent::JoinRejected { .. }));
    }

    #[test]
    fn when_member_rejoins_own_full_room_then_join_is_accepted() {
        let mut settings = settings_without_bots();
        settings.room_capacity = 1;
        let (mut world, _clock) = world_with_settings(settings, ManualClock::new());
        join(&mut world, "p1", "a");
        world.drain_outbox();

        join(&mut world, "p1", "a");

        assert!(world.store().room("a").is_some_and(|r| r.members.contains("p1")));
        let outbox = world.drain_outbox();
        assert!(
            !outbox
                .iter()
                .any(|out| matches!(out.event, ServerEvent::JoinRejected { .. }))
        );
    }

    #[test]
    fn when_last_member_leaves_client_room_then_room_is_dropped() {
        let (mut world, _clock) = world_with_settings(settings_without_bots(), ManualClock::new());
        for n in 0..50 {
            join(&mut world, "p1", &format!("hop-{n}"));
        }
        assert_eq!(world.store().rooms().count(), 1);

        world.leave("p1");

        assert_eq!(world.store().rooms().count(), 0);
        assert_eq!(world.take_rooms_changed(), Some(Vec::new()));
    }

    #[test]
    fn when_last_member_leaves_open_chain_room_then_room_stays_listed() {
        let (mut world, _clock) = world_with_settings(settings_without_bots(), ManualClock::new());
        world
            .match_created(MatchCreated {
                match_addr: "match-1".to_string(),
                creator: "creator".to_string(),
                timestamp: 0,
            })
            .expect("match should be accepted");
        join(&mut world, "p1", "match-1");

        world.leave("p1");
        assert!(world.store().room("match-1").is_some_and(|r| r.members.is_empty()));

        if let Some(room) = world.store.room_mut("match-1") {
            room.active = false;
        }
        join(&mut world, "p1", "match-1");
        world.leave("p1");
        assert!(world.store().room("match-1").is_none());
    }
}
