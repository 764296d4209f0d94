use std::time::Duration;

// Port for reading time. Wall-clock millis stamp records and drive effect
// expiry; the monotonic reading drives cooldowns and never goes backwards.
pub trait Clock: Send + Sync {
    fn now_epoch_millis(&self) -> u64;
    fn monotonic(&self) -> Duration;
}
