// Gameplay tuning, kept apart from runtime/server configuration.

pub mod bot;
pub mod combat;
pub mod reward;

pub use bot::BotTuning;
pub use combat::CombatTuning;
pub use reward::RewardTuning;
