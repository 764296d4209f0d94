// Small adapter-side helpers: ids and the wall/monotonic clock.

pub mod clock;
pub mod rng;
