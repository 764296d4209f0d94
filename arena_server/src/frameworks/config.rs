use crate::domain::tuning::RewardTuning;
use std::{env, net::IpAddr, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;
pub const EVENT_BROADCAST_CAPACITY: usize = 1024;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_TICK_RATE_HZ: u32 = 60;
const DEFAULT_CLIENT_URL: &str = "http://localhost:3000";
const DEFAULT_BASE_REWARD_SOL: f64 = 0.01;
const DEFAULT_BONUS_PER_LEVEL_SOL: f64 = 0.002;
const DEV_ORIGINS: [&str; 4] = [
    "http://localhost:3001",
    "http://localhost:3002",
    "http://localhost:3003",
    "http://localhost:5173",
];

fn var(name: &str) -> Option<String> {
    env::var(name).ok()
}

pub fn http_port() -> u16 {
    parse_port(var("PORT").as_deref())
}

pub fn bind_host() -> IpAddr {
    parse_bind_host(var("BIND_HOST").as_deref())
}

pub fn tick_interval() -> Duration {
    tick_interval_for(parse_tick_rate(var("TICK_RATE_HZ").as_deref()))
}

pub fn reward_tuning() -> RewardTuning {
    RewardTuning::from_sol(
        parse_sol(var("BASE_REWARD_SOL").as_deref(), DEFAULT_BASE_REWARD_SOL),
        parse_sol(
            var("BONUS_PER_LEVEL_SOL").as_deref(),
            DEFAULT_BONUS_PER_LEVEL_SOL,
        ),
    )
}

pub fn allowed_origins() -> Vec<String> {
    parse_allowed_origins(
        var("ALLOWED_ORIGINS").as_deref(),
        var("CLIENT_URL").as_deref(),
    )
}

fn parse_port(value: Option<&str>) -> u16 {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

fn parse_bind_host(value: Option<&str>) -> IpAddr {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

fn parse_tick_rate(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|hz| (1..=1000).contains(hz))
        .unwrap_or(DEFAULT_TICK_RATE_HZ)
}

fn tick_interval_for(rate_hz: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(rate_hz))
}

fn parse_sol(value: Option<&str>, default: f64) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|sol| sol.is_finite() && *sol >= 0.0)
        .unwrap_or(default)
}

// An explicit list wins; otherwise the client URL plus the local dev ports.
fn parse_allowed_origins(explicit: Option<&str>, client_url: Option<&str>) -> Vec<String> {
    let listed: Vec<String> = explicit
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();
    if !listed.is_empty() {
        return listed;
    }

    let client_url = client_url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(DEFAULT_CLIENT_URL);
    std::iter::once(client_url)
        .chain(DEV_ORIGINS)
        .map(str::to_string)
        .collect()
}
