// Framework bootstrap for the arena server runtime.

use crate::domain::Clock;
use crate::frameworks::config;
use crate::interface_adapters::http::{
    health_handler, leaderboard_handler, recent_actions_handler, rooms_handler,
};
use crate::interface_adapters::net::{
    AddressedBytes, event_serializer, match_created_handler, match_settled_handler,
    purchase_handler, world_update_serializer, ws_handler,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::clock::SystemClock;
use crate::use_cases::{
    AnalyticsSnapshot, GameEvent, Outbound, World, WorldSettings, WorldUpdate, analytics_task,
    world_task,
};

use axum::{
    Router,
    extract::ws::Utf8Bytes,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{broadcast, mpsc, watch};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();
    let cors = cors_layer(&state.allowed_origins);

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .route("/api/rooms", get(rooms_handler))
        .route("/api/leaderboard", get(leaderboard_handler))
        .route("/api/recent-actions", get(recent_actions_handler))
        .route("/internal/anchor/match-created", post(match_created_handler))
        .route("/internal/anchor/purchase", post(purchase_handler))
        .route("/internal/anchor/match-settled", post(match_settled_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::new(config::bind_host(), config::http_port());

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let tick_interval = config::tick_interval();
    let settings = WorldSettings {
        reward: config::reward_tuning(),
        ..WorldSettings::default()
    };

    // input_tx/rx: sessions and ingestion routes feed the single world task.
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(config::INPUT_CHANNEL_CAPACITY);
    let (world_tx, _) = broadcast::channel::<WorldUpdate>(config::WORLD_BROADCAST_CAPACITY);
    let (events_tx, _) = broadcast::channel::<Outbound>(config::EVENT_BROADCAST_CAPACITY);
    let (world_bytes_tx, _) = broadcast::channel::<Utf8Bytes>(config::WORLD_BROADCAST_CAPACITY);
    let (world_latest_tx, _) = watch::channel(Utf8Bytes::from(""));
    let (events_bytes_tx, _) =
        broadcast::channel::<AddressedBytes>(config::EVENT_BROADCAST_CAPACITY);
    let (rooms_tx, rooms_rx) = watch::channel(Vec::new());
    let (analytics_tx, analytics_rx) = watch::channel(AnalyticsSnapshot::default());

    // Subscribe before spawning the producer so nothing early is missed.
    tokio::spawn(world_update_serializer(
        world_tx.subscribe(),
        world_bytes_tx.clone(),
        world_latest_tx.clone(),
    ));
    tokio::spawn(event_serializer(
        events_tx.subscribe(),
        events_bytes_tx.clone(),
    ));
    tokio::spawn(analytics_task(
        events_tx.subscribe(),
        events_tx.clone(),
        analytics_tx,
        clock.clone(),
    ));

    let world = World::new(settings, clock.clone());
    tokio::spawn(world_task(
        world,
        input_rx,
        world_tx,
        events_tx,
        rooms_tx,
        tick_interval,
    ));
    tracing::debug!(
        tick_ms = tick_interval.as_millis() as u64,
        "world task spawned"
    );

    Arc::new(AppState {
        input_tx,
        world_bytes_tx,
        world_latest_tx,
        events_bytes_tx,
        rooms_rx,
        analytics_rx,
        clock,
        allowed_origins: config::allowed_origins().into(),
    })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    // Credentials cannot be combined with a wildcard origin.
    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(AllowOrigin::any());
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(values))
        .allow_credentials(true)
}
