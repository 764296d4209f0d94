use crate::domain::Vec3;
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{ClientMessage, GameStateDto, ServerMessage, Vec3Dto};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::session_id;
use crate::use_cases::{Audience, GameEvent, Outbound, WorldUpdate};

use axum::{
    Error, Json,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    http::{HeaderMap, StatusCode, header::ORIGIN},
    response::{IntoResponse, Response},
};
use futures::SinkExt;
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    Ws(axum::Error),
    Serialization(serde_json::Error),
    InputClosed,
    WorldUpdatesClosed,
    EventsClosed,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Ws(err) => write!(f, "websocket error: {err}"),
            NetError::Serialization(err) => write!(f, "serialization error: {err}"),
            NetError::InputClosed => write!(f, "world input channel closed"),
            NetError::WorldUpdatesClosed => write!(f, "world update stream closed"),
            NetError::EventsClosed => write!(f, "event stream closed"),
        }
    }
}

/// A serialized event together with the sessions it is meant for.
#[derive(Debug, Clone)]
pub struct AddressedBytes {
    pub audience: Audience,
    pub bytes: Utf8Bytes,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const MAX_NAME_LEN: usize = 32;
const MAX_ROOM_ID_LEN: usize = 128;

fn encode(msg: &ServerMessage) -> Option<Utf8Bytes> {
    match serde_json::to_string(msg) {
        Ok(txt) => Some(Utf8Bytes::from(txt)),
        Err(e) => {
            error!(error = ?e, "failed to serialize server message");
            None
        }
    }
}

pub async fn world_update_serializer(
    mut world_rx: broadcast::Receiver<WorldUpdate>,
    world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    world_latest_tx: watch::Sender<Utf8Bytes>,
) {
    loop {
        match world_rx.recv().await {
            Ok(update) => {
                let msg = ServerMessage::GameState(GameStateDto::from(update));
                let Some(bytes) = encode(&msg) else {
                    continue;
                };

                // Store the latest bytes for lag recovery, even with no receivers yet.
                world_latest_tx.send_replace(bytes.clone());
                let _ = world_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(
                    missed = n,
                    "world serializer lagged; skipping to latest update"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("world updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

/// Serializes each outbound event once and fans the bytes out to every connection.
pub async fn event_serializer(
    mut events_rx: broadcast::Receiver<Outbound>,
    events_bytes_tx: broadcast::Sender<AddressedBytes>,
) {
    loop {
        match events_rx.recv().await {
            Ok(Outbound { audience, event }) => {
                let Some(bytes) = encode(&ServerMessage::from(event)) else {
                    continue;
                };
                let _ = events_bytes_tx.send(AddressedBytes { audience, bytes });
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "event serializer lagged; events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("events channel closed; serializer exiting");
                break;
            }
        }
    }
}

/// Browsers always send `Origin`; other clients may omit it and are let through.
fn origin_allowed(headers: &HeaderMap, allowed: &[String]) -> bool {
    let Some(origin) = headers.get(ORIGIN) else {
        return true;
    };
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    allowed.iter().any(|a| a == "*" || a == origin)
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    if !origin_allowed(&headers, &state.allowed_origins) {
        warn!(origin = ?headers.get(ORIGIN), "websocket origin rejected");
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "origin not allowed".to_string(),
            }),
        )
            .into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = session_id();
    let span = info_span!("conn", session_id = %session_id);
    run_session(socket, state, session_id).instrument(span).await
}

async fn run_session(mut socket: WebSocket, state: Arc<AppState>, session_id: String) {
    // Subscribe before the first await so nothing addressed to this session is missed.
    let world_bytes_rx = state.world_bytes_tx.subscribe();
    let world_latest_rx = state.world_latest_tx.subscribe();
    let events_rx = state.events_bytes_tx.subscribe();

    let identity_msg = ServerMessage::Identity {
        player_id: session_id.clone(),
    };
    let identity_bytes = match send_message(&mut socket, &identity_msg).await {
        Ok(bytes) => bytes as u64,
        Err(e) => {
            warn!(error = %e, "failed to send identity");
            return;
        }
    };
    info!("client connected");

    let now = Instant::now()
        .checked_sub(LOG_THROTTLE)
        .unwrap_or_else(Instant::now);
    let mut ctx = ConnCtx {
        session_id,
        input_tx: state.input_tx.clone(),
        world_bytes_rx,
        world_latest_rx,
        events_rx,
        lag_recovery_count: 0,

        msgs_in: 0,
        msgs_out: 1,
        bytes_in: 0,
        bytes_out: identity_bytes,

        invalid_json: 0,

        last_input_full_log: now,
        last_world_lag_log: now,
        last_event_lag_log: now,
        last_invalid_input_log: now,

        close_frame: None,
    };

    // Main Client Loop
    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = %e, "client loop exited with error");
    }

    disconnect_cleanup(&ctx).await;
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

struct ConnCtx {
    pub session_id: String,
    pub input_tx: mpsc::Sender<GameEvent>,
    pub world_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    pub world_latest_rx: watch::Receiver<Utf8Bytes>,
    pub events_rx: broadcast::Receiver<AddressedBytes>,
    // Count lag recovery snapshots sent to this client.
    pub lag_recovery_count: u64,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,

    pub last_input_full_log: Instant,
    pub last_world_lag_log: Instant,
    pub last_event_lag_log: Instant,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

enum LoopControl {
    Continue,
    Disconnect,
}

/// Why a well-formed client message never reaches the world.
#[derive(Debug, PartialEq)]
enum InputRejection {
    NonFiniteVector,
    EmptyRoomId,
    RoomIdTooLong,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

fn finite(v: Vec3Dto) -> Result<Vec3, InputRejection> {
    let v = Vec3::from(v);
    if v.is_finite() {
        Ok(v)
    } else {
        Err(InputRejection::NonFiniteVector)
    }
}

/// Maps a parsed client message to a world input, sanitizing it on the way.
fn to_game_event(session_id: &str, msg: ClientMessage) -> Result<GameEvent, InputRejection> {
    let session_id = session_id.to_string();
    match msg {
        ClientMessage::JoinRoom {
            room_id,
            player_name,
        } => {
            let room_id = room_id.trim();
            if room_id.is_empty() {
                return Err(InputRejection::EmptyRoomId);
            }
            if room_id.len() > MAX_ROOM_ID_LEN {
                return Err(InputRejection::RoomIdTooLong);
            }
            let player_name: String = player_name.trim().chars().take(MAX_NAME_LEN).collect();
            Ok(GameEvent::Join {
                session_id,
                room_id: room_id.to_string(),
                player_name,
            })
        }
        ClientMessage::LeaveRoom => Ok(GameEvent::Leave { session_id }),
        ClientMessage::PlayerMove { position, rotation } => Ok(GameEvent::Move {
            session_id,
            position: finite(position)?,
            rotation: finite(rotation)?,
        }),
        ClientMessage::PlayerShoot {
            direction,
            projectile_type,
        } => Ok(GameEvent::Shoot {
            session_id,
            direction: finite(direction)?,
            projectile_type,
        }),
        ClientMessage::RequestGameState => Ok(GameEvent::RequestState { session_id }),
    }
}

// Room membership changes are awaited; high-rate inputs are dropped when the world is busy.
async fn dispatch(
    input_tx: &mpsc::Sender<GameEvent>,
    event: GameEvent,
    last_input_full_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match event {
        GameEvent::Join { .. } | GameEvent::Leave { .. } => {
            input_tx
                .send(event)
                .await
                .map_err(|_| NetError::InputClosed)?;
            Ok(LoopControl::Continue)
        }
        event => match input_tx.try_send(event) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(mpsc::error::TrySendError::Full(_evt)) => {
                if should_log(last_input_full_log) {
                    warn!("input channel full; dropping input");
                }
                Ok(LoopControl::Continue)
            }
            Err(mpsc::error::TrySendError::Closed(_evt)) => Err(NetError::InputClosed),
        },
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        session_id,
        input_tx,
        world_bytes_rx,
        world_latest_rx,
        events_rx,
        lag_recovery_count,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        last_input_full_log,
        last_world_lag_log,
        last_event_lag_log,
        last_invalid_input_log,
        close_frame,
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        // disconnect becomes true on error
        let disconnect: bool = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    session_id,
                    input_tx,
                    msgs_in,
                    bytes_in,
                    invalid_json,
                    last_input_full_log,
                    last_invalid_input_log,
                    close_frame,
                ).await {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing World Update
            world_msg = world_bytes_rx.recv() => {
                match world_msg {
                    Ok(bytes) => match forward_bytes(bytes, socket, msgs_out, bytes_out).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(last_world_lag_log) {
                            warn!(missed = n, "world updates lagged; sending snapshot");
                        }

                        // Resync strategy: send the latest world snapshot.
                        let latest = world_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            false
                        } else {
                            *lag_recovery_count += 1;
                            debug!(count = *lag_recovery_count, "sent lag recovery snapshot");
                            match forward_bytes(latest, socket, msgs_out, bytes_out).await {
                                LoopControl::Continue => false,
                                LoopControl::Disconnect => true,
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::WorldUpdatesClosed);
                        true
                    }
                }
            }

            // Outgoing addressed events
            event = events_rx.recv() => {
                match event {
                    Ok(AddressedBytes { audience, bytes }) => {
                        if audience.includes(session_id) {
                            match forward_bytes(bytes, socket, msgs_out, bytes_out).await {
                                LoopControl::Continue => false,
                                LoopControl::Disconnect => true,
                            }
                        } else {
                            false
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Events are not replayable; the next snapshot repairs state.
                        if should_log(last_event_lag_log) {
                            warn!(missed = n, "events lagged; skipped events");
                        }
                        false
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::EventsClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = %err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    session_id: &str,
    input_tx: &mpsc::Sender<GameEvent>,
    msgs_in: &mut u64,
    bytes_in: &mut u64,
    invalid_json: &mut u32,
    last_input_full_log: &mut Instant,
    last_invalid_input_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                *msgs_in += 1;
                *bytes_in += text.len() as u64;

                let parsed = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(parsed) => parsed,
                    Err(parse_err) => {
                        *invalid_json += 1;
                        if should_log(last_invalid_input_log) {
                            warn!(
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if *invalid_json > MAX_INVALID_JSON {
                            *close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }
                        return Ok(LoopControl::Continue);
                    }
                };

                match to_game_event(session_id, parsed) {
                    Ok(event) => dispatch(input_tx, event, last_input_full_log).await,
                    Err(rejection) => {
                        if should_log(last_invalid_input_log) {
                            warn!(?rejection, "invalid input; dropping");
                        }
                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_bytes(
    msg: Utf8Bytes,
    socket: &mut WebSocket,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
) -> LoopControl {
    let bytes_len = msg.len();
    match socket.send(Message::Text(msg)).await.map_err(NetError::Ws) {
        Ok(()) => {
            *msgs_out += 1;
            *bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = %err, "failed to send to client");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(ctx: &ConnCtx) {
    // Disconnect is an implicit leave; the world ignores sessions that never joined.
    if ctx
        .input_tx
        .send(GameEvent::Leave {
            session_id: ctx.session_id.clone(),
        })
        .await
        .is_err()
    {
        warn!("input channel closed during disconnect cleanup");
    }

    info!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        lag_recoveries = ctx.lag_recovery_count,
        "client disconnected"
    );
}
