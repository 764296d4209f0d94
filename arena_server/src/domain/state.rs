// Domain-level simulation entities.

use super::math::Vec3;
use std::collections::BTreeSet;

pub type PlayerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    /// Team assignment by parity of the current room size (even -> blue).
    pub fn for_member_count(count: usize) -> Self {
        if count % 2 == 0 { Team::Blue } else { Team::Red }
    }
}

/// Who drives a player entity; fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    Human,
    Bot,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub room_id: String,
    pub position: Vec3,
    // Euler angles; yaw lives in `y`.
    pub rotation: Vec3,
    pub health: i32,
    pub max_health: i32,
    pub team: Team,
    pub alive: bool,
    // Epoch millis of the last pose update.
    pub last_update: u64,
    pub controller: Controller,
}

impl Player {
    pub fn is_bot(&self) -> bool {
        self.controller == Controller::Bot
    }

    pub fn restore(&mut self) {
        self.health = self.max_health;
        self.alive = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Bullet,
    Laser,
    Rocket,
}

impl ProjectileKind {
    /// Parses a client label; anything unrecognized is a bullet.
    pub fn from_label(label: &str) -> Self {
        match label {
            "laser" => ProjectileKind::Laser,
            "rocket" => ProjectileKind::Rocket,
            _ => ProjectileKind::Bullet,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectileKind::Bullet => "bullet",
            ProjectileKind::Laser => "laser",
            ProjectileKind::Rocket => "rocket",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: String,
    pub position: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub damage: i32,
    pub owner_id: PlayerId,
    pub kind: ProjectileKind,
    // Seconds left before removal.
    pub lifetime: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEffectKind {
    DropHealth,
    DropAmmo,
    DropShield,
    SpawnLaser,
    SpawnMinion,
    SpawnMine,
    GravityFlip,
    SlowMotion,
    SpawnTurret,
    RainCoins,
}

impl ViewerEffectKind {
    pub const ALL: [ViewerEffectKind; 10] = [
        ViewerEffectKind::DropHealth,
        ViewerEffectKind::DropAmmo,
        ViewerEffectKind::DropShield,
        ViewerEffectKind::SpawnLaser,
        ViewerEffectKind::SpawnMinion,
        ViewerEffectKind::SpawnMine,
        ViewerEffectKind::GravityFlip,
        ViewerEffectKind::SlowMotion,
        ViewerEffectKind::SpawnTurret,
        ViewerEffectKind::RainCoins,
    ];

    /// On-chain effect code as emitted by the purchase instruction.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Price tier lookup used when a purchase carries no known effect code.
    pub fn from_amount(amount_sol: f64) -> Self {
        if amount_sol >= 0.08 {
            ViewerEffectKind::RainCoins
        } else if amount_sol >= 0.06 {
            ViewerEffectKind::SpawnTurret
        } else if amount_sol >= 0.05 {
            ViewerEffectKind::GravityFlip
        } else if amount_sol >= 0.04 {
            ViewerEffectKind::SlowMotion
        } else if amount_sol >= 0.03 {
            ViewerEffectKind::SpawnMinion
        } else if amount_sol >= 0.025 {
            ViewerEffectKind::SpawnMine
        } else if amount_sol >= 0.02 {
            ViewerEffectKind::SpawnLaser
        } else if amount_sol >= 0.015 {
            ViewerEffectKind::DropShield
        } else if amount_sol >= 0.01 {
            ViewerEffectKind::DropHealth
        } else {
            ViewerEffectKind::DropAmmo
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewerEffectKind::DropHealth => "drop_health",
            ViewerEffectKind::DropAmmo => "drop_ammo",
            ViewerEffectKind::DropShield => "drop_shield",
            ViewerEffectKind::SpawnLaser => "spawn_laser",
            ViewerEffectKind::SpawnMinion => "spawn_minion",
            ViewerEffectKind::SpawnMine => "spawn_mine",
            ViewerEffectKind::GravityFlip => "gravity_flip",
            ViewerEffectKind::SlowMotion => "slow_motion",
            ViewerEffectKind::SpawnTurret => "spawn_turret",
            ViewerEffectKind::RainCoins => "rain_coins",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerEffect {
    pub id: String,
    pub kind: ViewerEffectKind,
    pub position: Option<Vec3>,
    pub wallet_address: String,
    // Native token units (not lamports).
    pub amount: f64,
    // Server epoch millis at creation; drives expiry.
    pub timestamp: u64,
    pub transaction_ref: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    FreeForAll,
}

impl GameMode {
    pub fn label(self) -> &'static str {
        match self {
            GameMode::FreeForAll => "ffa",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub members: BTreeSet<PlayerId>,
    pub max_players: usize,
    pub game_mode: GameMode,
    pub active: bool,
    pub created_at: u64,
    // Opened by an on-chain match rather than a client join; outlives its members.
    pub from_chain: bool,
}

impl Room {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        max_players: usize,
        created_at: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: BTreeSet::new(),
            max_players,
            game_mode: GameMode::FreeForAll,
            active: true,
            created_at,
            from_chain: false,
        }
    }

    pub fn for_chain_match(
        id: impl Into<String>,
        name: impl Into<String>,
        max_players: usize,
        created_at: u64,
    ) -> Self {
        Self {
            from_chain: true,
            ..Self::new(id, name, max_players, created_at)
        }
    }

    /// Empty rooms are dropped unless an open on-chain match still needs them listed.
    pub fn is_abandoned(&self) -> bool {
        self.members.is_empty() && !(self.from_chain && self.active)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_players
    }
}
