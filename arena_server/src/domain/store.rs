// Authoritative in-memory storage for every live entity.

use super::state::{Player, PlayerId, Projectile, Room, ViewerEffect};
use std::collections::{BTreeMap, HashMap};

/// Owns players, projectiles, viewer effects and rooms keyed by id.
///
/// Players and rooms use ordered maps so that iteration (and every tie-break
/// built on it) is deterministic. Callers that need to mutate while walking
/// the players take a snapshot with [`EntityStore::player_ids`] first.
#[derive(Debug, Default)]
pub struct EntityStore {
    players: BTreeMap<PlayerId, Player>,
    projectiles: HashMap<String, Projectile>,
    effects: HashMap<String, ViewerEffect>,
    rooms: BTreeMap<String, Room>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Players.

    pub fn upsert_player(&mut self, player: Player) -> Option<Player> {
        self.players.insert(player.id.clone(), player)
    }

    pub fn remove_player(&mut self, id: &str) -> Option<Player> {
        self.players.remove(id)
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().cloned().collect()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    // Projectiles.

    pub fn insert_projectile(&mut self, projectile: Projectile) {
        self.projectiles.insert(projectile.id.clone(), projectile);
    }

    pub fn projectile(&self, id: &str) -> Option<&Projectile> {
        self.projectiles.get(id)
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    pub fn projectiles_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.projectiles.values_mut()
    }

    pub fn retain_projectiles(&mut self, mut keep: impl FnMut(&Projectile) -> bool) {
        self.projectiles.retain(|_, p| keep(p));
    }

    // Viewer effects.

    pub fn insert_effect(&mut self, effect: ViewerEffect) {
        self.effects.insert(effect.id.clone(), effect);
    }

    pub fn effect(&self, id: &str) -> Option<&ViewerEffect> {
        self.effects.get(id)
    }

    pub fn effects(&self) -> impl Iterator<Item = &ViewerEffect> {
        self.effects.values()
    }

    pub fn retain_effects(&mut self, mut keep: impl FnMut(&ViewerEffect) -> bool) {
        self.effects.retain(|_, e| keep(e));
    }

    // Rooms.

    pub fn insert_room(&mut self, room: Room) {
        self.rooms.insert(room.id.clone(), room);
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn room_mut(&mut self, id: &str) -> Option<&mut Room> {
        self.rooms.get_mut(id)
    }

    pub fn remove_room(&mut self, id: &str) -> Option<Room> {
        self.rooms.remove(id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Player ids registered in a room; empty when the room does not exist.
    pub fn room_members(&self, room_id: &str) -> Vec<PlayerId> {
        self.rooms
            .get(room_id)
            .map(|room| room.members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns false when the room does not exist.
    pub fn add_member(&mut self, room_id: &str, player_id: &str) -> bool {
        match self.rooms.get_mut(room_id) {
            Some(room) => {
                room.members.insert(player_id.to_string());
                true
            }
            None => false,
        }
    }

    pub fn remove_member(&mut self, room_id: &str, player_id: &str) {
        if let Some(room) = self.rooms.get_mut(room_id) {
            room.members.remove(player_id);
        }
    }

    /// Live player records of a room, in id order.
    pub fn room_players(&self, room_id: &str) -> Vec<&Player> {
        self.rooms
            .get(room_id)
            .into_iter()
            .flat_map(|room| room.members.iter())
            .filter_map(|id| self.players.get(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::math::Vec3;
    use crate::domain::state::{Controller, Team};

    fn player(id: &str, room_id: &str) -> Player {
        Player {
            id: id.to_string(),
            name: id.to_string(),
            room_id: room_id.to_string(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            health: 100,
            max_health: 100,
            team: Team::Blue,
            alive: true,
            last_update: 0,
            controller: Controller::Human,
        }
    }

    #[test]
    fn when_player_is_upserted_twice_then_latest_record_wins() {
        let mut store = EntityStore::new();
        store.upsert_player(player("p1", "r1"));
        let mut updated = player("p1", "r1");
        updated.health = 40;

        let previous = store.upsert_player(updated);

        assert_eq!(previous.map(|p| p.health), Some(100));
        assert_eq!(store.player("p1").map(|p| p.health), Some(40));
        assert_eq!(store.player_count(), 1);
    }

    #[test]
    fn when_removing_missing_player_then_returns_none() {
        let mut store = EntityStore::new();
        assert!(store.remove_player("ghost").is_none());
    }

    #[test]
    fn when_ids_are_snapshotted_then_removal_during_walk_is_safe() {
        let mut store = EntityStore::new();
        for id in ["a", "b", "c"] {
            store.upsert_player(player(id, "r1"));
        }

        for id in store.player_ids() {
            if id != "b" {
                store.remove_player(&id);
            }
        }

        assert_eq!(store.player_ids(), vec!["b".to_string()]);
    }

    #[test]
    fn when_room_lists_members_then_only_live_players_are_returned() {
        let mut store = EntityStore::new();
        let mut room = Room::new("r1", "Room r1", 8, 0);
        room.members.insert("p1".to_string());
        room.members.insert("stale".to_string());
        store.insert_room(room);
        store.upsert_player(player("p1", "r1"));

        let ids: Vec<&str> = store
            .room_players("r1")
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();

        assert_eq!(ids, vec!["p1"]);
        assert_eq!(store.room_members("missing"), Vec::<String>::new());
    }

    #[test]
    fn when_room_is_removed_then_it_is_no_longer_listed() {
        let mut store = EntityStore::new();
        store.insert_room(Room::new("r1", "Room r1", 8, 0));

        assert!(store.remove_room("r1").is_some());
        assert!(store.room("r1").is_none());
        assert!(store.remove_room("r1").is_none());
    }
}
