// Wire protocol DTOs and conversions for public game server messages.
// Chain ingestion payloads keep the relayer's snake_case field names.

use crate::domain::errors::JoinError;
use crate::domain::{Player, Projectile, Team, Vec3, ViewerEffect};
use crate::use_cases::{
    AnalyticsSnapshot, MatchCreated, MatchSettled, PurchaseMade, RoomSummary, ServerEvent,
    ViewerSpender, WorldUpdate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    // Session id assigned when the socket is accepted.
    Identity { player_id: String },
    GameState(GameStateDto),
    PlayerJoined(PlayerDto),
    PlayerLeft { player_id: String },
    PlayerMove(PlayerDto),
    PlayerHit {
        player_id: String,
        damage: i32,
        attacker_id: String,
    },
    PlayerDied { player_id: String, killer_id: String },
    RoundEnd {
        winner: Option<PlayerDto>,
        reward_lamports: u64,
    },
    ProjectileCreated(ProjectileDto),
    EffectTriggered(ViewerEffectDto),
    JoinRejected { room_id: String, reason: &'static str },
    AnchorMatchCreated {
        match_id: String,
        creator: String,
        timestamp: i64,
    },
    AnchorPurchase(PurchaseRequest),
    AnchorMatchSettled(MatchSettledRequest),
    AnalyticsUpdate(AnalyticsDto),
}

impl From<ServerEvent> for ServerMessage {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::GameState(update) => ServerMessage::GameState(update.into()),
            ServerEvent::PlayerJoined(player) => ServerMessage::PlayerJoined((&player).into()),
            ServerEvent::PlayerLeft { player_id } => ServerMessage::PlayerLeft { player_id },
            ServerEvent::PlayerMove(player) => ServerMessage::PlayerMove((&player).into()),
            ServerEvent::PlayerHit {
                player_id,
                damage,
                attacker_id,
            } => ServerMessage::PlayerHit {
                player_id,
                damage,
                attacker_id,
            },
            ServerEvent::PlayerDied {
                player_id,
                killer_id,
            } => ServerMessage::PlayerDied {
                player_id,
                killer_id,
            },
            ServerEvent::RoundEnd {
                winner,
                reward_lamports,
            } => ServerMessage::RoundEnd {
                winner: winner.as_ref().map(PlayerDto::from),
                reward_lamports,
            },
            ServerEvent::ProjectileCreated(projectile) => {
                ServerMessage::ProjectileCreated((&projectile).into())
            }
            ServerEvent::EffectTriggered(effect) => ServerMessage::EffectTriggered((&effect).into()),
            ServerEvent::JoinRejected { room_id, reason } => ServerMessage::JoinRejected {
                room_id,
                reason: join_error_code(&reason),
            },
            ServerEvent::AnchorMatchCreated {
                match_id,
                creator,
                timestamp,
            } => ServerMessage::AnchorMatchCreated {
                match_id,
                creator,
                timestamp,
            },
            ServerEvent::AnchorPurchase(purchase) => ServerMessage::AnchorPurchase(purchase.into()),
            ServerEvent::AnchorMatchSettled(settled) => {
                ServerMessage::AnchorMatchSettled(settled.into())
            }
            ServerEvent::AnalyticsUpdate(snapshot) => ServerMessage::AnalyticsUpdate(snapshot.into()),
        }
    }
}

fn join_error_code(error: &JoinError) -> &'static str {
    match error {
        JoinError::RoomFull => "room_full",
    }
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    JoinRoom {
        room_id: String,
        player_name: String,
    },
    LeaveRoom,
    PlayerMove {
        position: Vec3Dto,
        rotation: Vec3Dto,
    },
    PlayerShoot {
        direction: Vec3Dto,
        // Missing or unknown kinds become bullets.
        #[serde(default)]
        projectile_type: String,
    },
    RequestGameState,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3Dto {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for Vec3Dto {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<Vec3Dto> for Vec3 {
    fn from(v: Vec3Dto) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: String,
    pub name: String,
    pub position: Vec3Dto,
    pub rotation: Vec3Dto,
    pub health: i32,
    pub max_health: i32,
    pub team: &'static str,
    pub is_alive: bool,
    pub last_update: u64,
    pub is_bot: bool,
}

impl From<&Player> for PlayerDto {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            position: player.position.into(),
            rotation: player.rotation.into(),
            health: player.health,
            max_health: player.max_health,
            team: match player.team {
                Team::Blue => "blue",
                Team::Red => "red",
            },
            is_alive: player.alive,
            last_update: player.last_update,
            is_bot: player.is_bot(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileDto {
    pub id: String,
    pub position: Vec3Dto,
    pub direction: Vec3Dto,
    pub speed: f32,
    pub damage: i32,
    pub owner_id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub lifetime: f32,
}

impl From<&Projectile> for ProjectileDto {
    fn from(projectile: &Projectile) -> Self {
        Self {
            id: projectile.id.clone(),
            position: projectile.position.into(),
            direction: projectile.direction.into(),
            speed: projectile.speed,
            damage: projectile.damage,
            owner_id: projectile.owner_id.clone(),
            kind: projectile.kind.label(),
            lifetime: projectile.lifetime,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerEffectDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3Dto>,
    pub wallet_address: String,
    pub amount: f64,
    pub timestamp: u64,
    pub transaction_hash: String,
}

impl From<&ViewerEffect> for ViewerEffectDto {
    fn from(effect: &ViewerEffect) -> Self {
        Self {
            id: effect.id.clone(),
            kind: effect.kind.label(),
            position: effect.position.map(Vec3Dto::from),
            wallet_address: effect.wallet_address.clone(),
            amount: effect.amount,
            timestamp: effect.timestamp,
            transaction_hash: effect.transaction_ref.clone(),
        }
    }
}

/// Full game state; entity collections are keyed by id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateDto {
    pub tick: u64,
    pub players: BTreeMap<String, PlayerDto>,
    pub projectiles: BTreeMap<String, ProjectileDto>,
    pub effects: BTreeMap<String, ViewerEffectDto>,
    pub game_time: f64,
    pub round_number: u64,
    pub is_active: bool,
    pub gravity: Vec3Dto,
    pub time_scale: f32,
}

impl From<WorldUpdate> for GameStateDto {
    fn from(update: WorldUpdate) -> Self {
        Self {
            tick: update.tick,
            players: update
                .players
                .iter()
                .map(|p| (p.id.clone(), PlayerDto::from(p)))
                .collect(),
            projectiles: update
                .projectiles
                .iter()
                .map(|p| (p.id.clone(), ProjectileDto::from(p)))
                .collect(),
            effects: update
                .effects
                .iter()
                .map(|e| (e.id.clone(), ViewerEffectDto::from(e)))
                .collect(),
            game_time: update.game_time,
            round_number: update.round_number,
            is_active: update.active,
            gravity: update.gravity.into(),
            time_scale: update.time_scale,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: String,
    pub name: String,
    pub players: Vec<String>,
    pub max_players: usize,
    pub game_mode: &'static str,
    pub is_active: bool,
    pub created_at: u64,
}

impl From<&RoomSummary> for RoomDto {
    fn from(room: &RoomSummary) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            players: room.players.clone(),
            max_players: room.max_players,
            game_mode: room.game_mode,
            is_active: room.active,
            created_at: room.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSpenderDto {
    pub wallet_address: String,
    pub nickname: String,
    pub total_spent: f64,
    pub effect_count: u32,
    pub last_activity: u64,
}

impl From<&ViewerSpender> for ViewerSpenderDto {
    fn from(spender: &ViewerSpender) -> Self {
        Self {
            wallet_address: spender.wallet_address.clone(),
            nickname: spender.nickname.clone(),
            total_spent: spender.total_spent,
            effect_count: spender.effect_count,
            last_activity: spender.last_activity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDto {
    pub leaderboard: Vec<ViewerSpenderDto>,
    pub recent_actions: Vec<ViewerEffectDto>,
    pub timestamp: u64,
}

impl From<AnalyticsSnapshot> for AnalyticsDto {
    fn from(snapshot: AnalyticsSnapshot) -> Self {
        Self {
            leaderboard: snapshot.leaderboard.iter().map(ViewerSpenderDto::from).collect(),
            recent_actions: snapshot
                .recent_actions
                .iter()
                .map(ViewerEffectDto::from)
                .collect(),
            timestamp: snapshot.timestamp,
        }
    }
}

/// Relayer payload for a match opened on-chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCreatedRequest {
    pub match_addr: String,
    pub creator: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl From<MatchCreatedRequest> for MatchCreated {
    fn from(request: MatchCreatedRequest) -> Self {
        Self {
            match_addr: request.match_addr,
            creator: request.creator,
            timestamp: request.timestamp,
        }
    }
}

/// Relayer payload for a viewer purchase; `amount` is lamports as a decimal string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub buyer: String,
    pub match_addr: String,
    pub effect_type: u8,
    pub amount: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl From<PurchaseRequest> for PurchaseMade {
    fn from(request: PurchaseRequest) -> Self {
        Self {
            buyer: request.buyer,
            match_addr: request.match_addr,
            effect_type: request.effect_type,
            amount: request.amount,
            timestamp: request.timestamp,
        }
    }
}

impl From<PurchaseMade> for PurchaseRequest {
    fn from(event: PurchaseMade) -> Self {
        Self {
            buyer: event.buyer,
            match_addr: event.match_addr,
            effect_type: event.effect_type,
            amount: event.amount,
            timestamp: event.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSettledRequest {
    pub match_addr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub pot: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl From<MatchSettledRequest> for MatchSettled {
    fn from(request: MatchSettledRequest) -> Self {
        Self {
            match_addr: request.match_addr,
            winner: request.winner,
            pot: request.pot,
            timestamp: request.timestamp,
        }
    }
}

impl From<MatchSettled> for MatchSettledRequest {
    fn from(event: MatchSettled) -> Self {
        Self {
            match_addr: event.match_addr,
            winner: event.winner,
            pot: event.pot,
            timestamp: event.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Controller;
    use serde_json::json;

    #[test]
    fn when_join_room_is_parsed_then_camel_case_fields_map() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "joinRoom",
            "data": { "roomId": "arena", "playerName": "Ada" }
        }))
        .expect("valid joinRoom");

        match msg {
            ClientMessage::JoinRoom {
                room_id,
                player_name,
            } => {
                assert_eq!(room_id, "arena");
                assert_eq!(player_name, "Ada");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn when_unit_messages_have_no_data_then_they_still_parse() {
        let leave: ClientMessage =
            serde_json::from_value(json!({ "type": "leaveRoom" })).expect("leaveRoom");
        assert!(matches!(leave, ClientMessage::LeaveRoom));

        let state: ClientMessage =
            serde_json::from_value(json!({ "type": "requestGameState" })).expect("request");
        assert!(matches!(state, ClientMessage::RequestGameState));
    }

    #[test]
    fn when_shoot_has_no_projectile_type_then_it_defaults_to_empty() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "playerShoot",
            "data": { "direction": { "x": 0.0, "y": 0.0, "z": 1.0 } }
        }))
        .expect("valid playerShoot");

        assert!(matches!(
            msg,
            ClientMessage::PlayerShoot { ref projectile_type, .. } if projectile_type.is_empty()
        ));
    }

    #[test]
    fn when_player_hit_is_serialized_then_envelope_uses_camel_case() {
        let msg = ServerMessage::from(ServerEvent::PlayerHit {
            player_id: "b".to_string(),
            damage: 25,
            attacker_id: "a".to_string(),
        });

        let value = serde_json::to_value(&msg).expect("serialize");

        assert_eq!(
            value,
            json!({
                "type": "playerHit",
                "data": { "playerId": "b", "damage": 25, "attackerId": "a" }
            })
        );
    }

    #[test]
    fn when_game_state_is_serialized_then_players_are_keyed_by_id() {
        let player = Player {
            id: "p1".to_string(),
            name: "Ada".to_string(),
            room_id: "arena".to_string(),
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: Vec3::ZERO,
            health: 100,
            max_health: 100,
            team: Team::Blue,
            alive: true,
            last_update: 7,
            controller: Controller::Human,
        };
        let update = WorldUpdate {
            tick: 3,
            players: vec![player],
            projectiles: Vec::new(),
            effects: Vec::new(),
            game_time: 0.05,
            round_number: 1,
            active: true,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            time_scale: 1.0,
        };

        let value = serde_json::to_value(ServerMessage::from(ServerEvent::GameState(update)))
            .expect("serialize");

        assert_eq!(value["type"], "gameState");
        let data = &value["data"];
        assert_eq!(data["tick"], 3);
        assert_eq!(data["roundNumber"], 1);
        assert_eq!(data["isActive"], true);
        assert_eq!(data["players"]["p1"]["team"], "blue");
        assert_eq!(data["players"]["p1"]["isAlive"], true);
        assert_eq!(data["players"]["p1"]["maxHealth"], 100);
        assert!(data["projectiles"].as_object().is_some_and(|m| m.is_empty()));
    }

    #[test]
    fn when_join_is_rejected_then_reason_is_a_stable_code() {
        let value = serde_json::to_value(ServerMessage::from(ServerEvent::JoinRejected {
            room_id: "arena".to_string(),
            reason: JoinError::RoomFull,
        }))
        .expect("serialize");

        assert_eq!(
            value,
            json!({ "type": "joinRejected", "data": { "roomId": "arena", "reason": "room_full" } })
        );
    }

    #[test]
    fn when_purchase_is_relayed_then_fields_pass_through_unchanged() {
        let request: PurchaseRequest = serde_json::from_value(json!({
            "buyer": "w1",
            "match_addr": "m1",
            "effect_type": 4,
            "amount": "30000000",
            "timestamp": 12
        }))
        .expect("valid purchase");
        let event = PurchaseMade::from(request);

        let value = serde_json::to_value(ServerMessage::from(ServerEvent::AnchorPurchase(event)))
            .expect("serialize");

        assert_eq!(value["type"], "anchorPurchase");
        assert_eq!(value["data"]["match_addr"], "m1");
        assert_eq!(value["data"]["amount"], "30000000");
    }
}
