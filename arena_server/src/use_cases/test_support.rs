// Shared fakes for use-case unit tests.

use super::types::{Outbound, ServerEvent};
use super::world::{World, WorldSettings};
use crate::domain::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Clock that only moves when told to; both readings advance together.
pub struct ManualClock {
    epoch_millis: AtomicU64,
    monotonic_millis: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            epoch_millis: AtomicU64::new(1_700_000_000_000),
            monotonic_millis: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        let millis = by.as_millis() as u64;
        self.epoch_millis.fetch_add(millis, Ordering::SeqCst);
        self.monotonic_millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_millis(&self) -> u64 {
        self.epoch_millis.load(Ordering::SeqCst)
    }

    fn monotonic(&self) -> Duration {
        Duration::from_millis(self.monotonic_millis.load(Ordering::SeqCst))
    }
}

pub fn world_with(clock: ManualClock) -> (World, Arc<ManualClock>) {
    world_with_settings(WorldSettings::default(), clock)
}

pub fn world_with_settings(settings: WorldSettings, clock: ManualClock) -> (World, Arc<ManualClock>) {
    let clock = Arc::new(clock);
    let world = World::new(settings, clock.clone());
    (world, clock)
}

/// Settings with bots disabled so tests control every participant.
pub fn settings_without_bots() -> WorldSettings {
    let mut settings = WorldSettings::default();
    settings.bots.per_room = 0;
    settings
}

pub fn events(outbox: &[Outbound]) -> Vec<&ServerEvent> {
    outbox.iter().map(|out| &out.event).collect()
}
