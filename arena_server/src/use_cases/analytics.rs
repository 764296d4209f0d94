// Viewer spend tracking fed by the world's outbound effect events.

use super::types::{Audience, Outbound, ServerEvent};
use crate::domain::{Clock, ViewerEffect};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

const LEADERBOARD_SIZE: usize = 10;
const RECENT_ACTIONS_KEPT: usize = 50;
const RECENT_ACTIONS_SHOWN: usize = 15;

const ADJECTIVES: [&str; 8] = ["Cool", "Epic", "Awesome", "Legendary", "Mega", "Super", "Ultra", "Pro"];
const NOUNS: [&str; 8] = ["Player", "Gamer", "Warrior", "Champion", "Hero", "Master", "Boss", "King"];

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSpender {
    pub wallet_address: String,
    pub nickname: String,
    // Native token units.
    pub total_spent: f64,
    pub effect_count: u32,
    pub last_activity: u64,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsSnapshot {
    pub leaderboard: Vec<ViewerSpender>,
    pub recent_actions: Vec<ViewerEffect>,
    pub timestamp: u64,
}

/// Running totals per wallet plus a short history of effects, newest first.
#[derive(Debug, Default)]
pub struct Analytics {
    spenders: HashMap<String, ViewerSpender>,
    recent: VecDeque<ViewerEffect>,
}

impl Analytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, effect: &ViewerEffect, now_millis: u64) {
        let spender = self
            .spenders
            .entry(effect.wallet_address.clone())
            .or_insert_with(|| ViewerSpender {
                wallet_address: effect.wallet_address.clone(),
                nickname: nickname_for(&effect.wallet_address),
                total_spent: 0.0,
                effect_count: 0,
                last_activity: now_millis,
            });
        spender.total_spent += effect.amount;
        spender.effect_count += 1;
        spender.last_activity = now_millis;

        self.recent.push_front(effect.clone());
        self.recent.truncate(RECENT_ACTIONS_KEPT);
    }

    /// Top spenders by total; equal totals are ordered by wallet address.
    pub fn leaderboard(&self) -> Vec<ViewerSpender> {
        let mut spenders: Vec<ViewerSpender> = self.spenders.values().cloned().collect();
        spenders.sort_by(|a, b| {
            b.total_spent
                .total_cmp(&a.total_spent)
                .then_with(|| a.wallet_address.cmp(&b.wallet_address))
        });
        spenders.truncate(LEADERBOARD_SIZE);
        spenders
    }

    pub fn recent_actions(&self) -> Vec<ViewerEffect> {
        self.recent.iter().take(RECENT_ACTIONS_SHOWN).cloned().collect()
    }

    pub fn spender(&self, wallet_address: &str) -> Option<&ViewerSpender> {
        self.spenders.get(wallet_address)
    }

    pub fn snapshot(&self, now_millis: u64) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            leaderboard: self.leaderboard(),
            recent_actions: self.recent_actions(),
            timestamp: now_millis,
        }
    }
}

/// Friendly, stable display name derived from a wallet address.
pub fn nickname_for(wallet_address: &str) -> String {
    // FNV-1a, 64-bit.
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in wallet_address.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    let adjective = ADJECTIVES[(hash % 8) as usize];
    let noun = NOUNS[((hash / 8) % 8) as usize];
    format!("{adjective}{noun}")
}

/// Consumes outbound events and keeps the analytics snapshot current.
///
/// Every `effectTriggered` updates the totals, replaces the watched
/// snapshot and broadcasts an `analyticsUpdate` to all sessions.
pub async fn analytics_task(
    mut events_rx: broadcast::Receiver<Outbound>,
    events_tx: broadcast::Sender<Outbound>,
    analytics_tx: watch::Sender<AnalyticsSnapshot>,
    clock: Arc<dyn Clock>,
) {
    let mut analytics = Analytics::new();

    loop {
        let outbound = match events_rx.recv().await {
            Ok(outbound) => outbound,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "analytics lagged behind outbound events");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        let ServerEvent::EffectTriggered(effect) = &outbound.event else {
            continue;
        };

        let now = clock.now_epoch_millis();
        analytics.record(effect, now);
        debug!(wallet = %effect.wallet_address, amount = effect.amount, "viewer action recorded");

        let snapshot = analytics.snapshot(now);
        analytics_tx.send_replace(snapshot.clone());
        // No subscribers just means no sessions are connected.
        let _ = events_tx.send(Outbound {
            audience: Audience::All,
            event: ServerEvent::AnalyticsUpdate(snapshot),
        });
    }

    info!("analytics task stopped");
}
