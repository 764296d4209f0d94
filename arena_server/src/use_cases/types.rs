// Use-case level inputs/outputs for the world task.

use crate::domain::errors::{IngestError, JoinError};
use crate::domain::{Player, PlayerId, Projectile, Vec3, ViewerEffect};
use crate::use_cases::analytics::AnalyticsSnapshot;
use std::sync::Arc;

/// Everything the world task can be asked to do, in arrival order.
#[derive(Debug, Clone)]
pub enum GameEvent {
    Join {
        session_id: PlayerId,
        room_id: String,
        player_name: String,
    },
    Leave {
        session_id: PlayerId,
    },
    Move {
        session_id: PlayerId,
        position: Vec3,
        rotation: Vec3,
    },
    Shoot {
        session_id: PlayerId,
        direction: Vec3,
        projectile_type: String,
    },
    RequestState {
        session_id: PlayerId,
    },
    External(ExternalEvent),
}

/// Events relayed from the on-chain monitor.
#[derive(Debug, Clone)]
pub enum ExternalEvent {
    MatchCreated(MatchCreated),
    Purchase(PurchaseMade),
    MatchSettled(MatchSettled),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCreated {
    pub match_addr: String,
    pub creator: String,
    // Chain timestamp in seconds; 0 when unknown.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseMade {
    pub buyer: String,
    pub match_addr: String,
    pub effect_type: u8,
    // Lamports as a decimal string, exactly as emitted on-chain.
    pub amount: String,
    pub timestamp: i64,
}

impl PurchaseMade {
    pub fn lamports(&self) -> Result<u64, IngestError> {
        self.amount
            .trim()
            .parse::<u64>()
            .map_err(|_| IngestError::InvalidAmount(self.amount.clone()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchSettled {
    pub match_addr: String,
    pub winner: Option<String>,
    pub pot: String,
    pub timestamp: i64,
}

/// Who should receive an outbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Audience {
    All,
    Session(PlayerId),
    // Resolved from room membership when the event is emitted.
    Sessions(Arc<[PlayerId]>),
}

impl Audience {
    pub fn includes(&self, session_id: &str) -> bool {
        match self {
            Audience::All => true,
            Audience::Session(id) => id == session_id,
            Audience::Sessions(ids) => ids.iter().any(|id| id == session_id),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ServerEvent {
    GameState(WorldUpdate),
    PlayerJoined(Player),
    PlayerLeft {
        player_id: PlayerId,
    },
    PlayerMove(Player),
    PlayerHit {
        player_id: PlayerId,
        damage: i32,
        attacker_id: PlayerId,
    },
    PlayerDied {
        player_id: PlayerId,
        killer_id: PlayerId,
    },
    RoundEnd {
        winner: Option<Player>,
        reward_lamports: u64,
    },
    ProjectileCreated(Projectile),
    EffectTriggered(ViewerEffect),
    JoinRejected {
        room_id: String,
        reason: JoinError,
    },
    AnchorMatchCreated {
        match_id: String,
        creator: String,
        timestamp: i64,
    },
    AnchorPurchase(PurchaseMade),
    AnchorMatchSettled(MatchSettled),
    AnalyticsUpdate(AnalyticsSnapshot),
}

#[derive(Debug, Clone)]
pub struct Outbound {
    pub audience: Audience,
    pub event: ServerEvent,
}

/// Full simulation snapshot for a given tick.
#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub tick: u64,
    pub players: Vec<Player>,
    pub projectiles: Vec<Projectile>,
    pub effects: Vec<ViewerEffect>,
    pub game_time: f64,
    pub round_number: u64,
    pub active: bool,
    pub gravity: Vec3,
    pub time_scale: f32,
}

/// Room listing entry for the HTTP surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub players: Vec<PlayerId>,
    pub max_players: usize,
    pub game_mode: &'static str,
    pub active: bool,
    pub created_at: u64,
}
