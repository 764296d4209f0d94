use crate::domain::store::EntityStore;

/// Viewer effects live for ten seconds of wall-clock time.
pub const EFFECT_TTL_MILLIS: u64 = 10_000;

/// Drops effects older than `ttl_millis`. Returns how many were removed.
pub fn expire_effects(store: &mut EntityStore, now_millis: u64, ttl_millis: u64) -> usize {
    let before = store.effects().count();
    store.retain_effects(|e| now_millis.saturating_sub(e.timestamp) <= ttl_millis);
    before - store.effects().count()
}
