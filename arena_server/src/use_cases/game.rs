use super::types::{GameEvent, Outbound, RoomSummary, WorldUpdate};
use super::world::World;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Owns the world and drives it: inputs as they arrive, ticks at a fixed rate.
///
/// After every input or tick the outbox is flushed to `events_tx` and the room
/// list is republished if it changed. All sends are non-blocking.
pub async fn world_task(
    mut world: World,
    mut input_rx: mpsc::Receiver<GameEvent>,
    world_tx: broadcast::Sender<WorldUpdate>,
    events_tx: broadcast::Sender<Outbound>,
    rooms_tx: watch::Sender<Vec<RoomSummary>>,
    tick_interval: Duration,
) {
    let dt = tick_interval.as_secs_f32();
    // Drive the fixed-step game loop at the configured tick rate.
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(tick_ms = tick_interval.as_millis() as u64, "world task started");

    loop {
        tokio::select! {
            input = input_rx.recv() => {
                let Some(event) = input else {
                    info!("input channel closed; world task exiting");
                    break;
                };
                world.handle(event);
            }
            _ = interval.tick() => {
                let update = world.tick(dt);
                // No receivers just means nobody is connected yet.
                let _ = world_tx.send(update);
            }
        }

        publish(&mut world, &events_tx, &rooms_tx);
    }
}

fn publish(
    world: &mut World,
    events_tx: &broadcast::Sender<Outbound>,
    rooms_tx: &watch::Sender<Vec<RoomSummary>>,
) {
    for outbound in world.drain_outbox() {
        if events_tx.send(outbound).is_err() {
            debug!("no event subscribers; dropping event");
        }
    }
    if let Some(rooms) = world.take_rooms_changed() {
        rooms_tx.send_replace(rooms);
    }
}
