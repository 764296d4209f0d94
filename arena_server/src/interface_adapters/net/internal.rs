// Internal routes used by the chain relayer to push match and purchase events.

use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{
    MatchCreatedRequest, MatchSettledRequest, PurchaseRequest,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{ExternalEvent, GameEvent, PurchaseMade};

use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, serde::Serialize)]
struct AcceptedResponse {
    status: &'static str,
}

fn bad_request(error: String) -> Response {
    warn!(%error, "rejected ingestion payload");
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
}

async fn forward(state: &AppState, event: ExternalEvent) -> Response {
    match state.input_tx.send(GameEvent::External(event)).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(AcceptedResponse { status: "accepted" }),
        )
            .into_response(),
        Err(_) => {
            warn!("world input closed; ingestion dropped");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "world unavailable".to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn match_created_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MatchCreatedRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    if payload.match_addr.trim().is_empty() {
        return bad_request("match_addr is required".to_string());
    }

    info!(match_addr = %payload.match_addr, "match-created received");
    forward(&state, ExternalEvent::MatchCreated(payload.into())).await
}

pub async fn purchase_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    let event = PurchaseMade::from(payload);
    // Validate here so malformed amounts never reach the simulation.
    if event.lamports().is_err() {
        return bad_request(format!(
            "amount must be a whole number of lamports, got {:?}",
            event.amount
        ));
    }

    info!(buyer = %event.buyer, effect_type = event.effect_type, "purchase received");
    forward(&state, ExternalEvent::Purchase(event)).await
}

pub async fn match_settled_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MatchSettledRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    if payload.match_addr.trim().is_empty() {
        return bad_request("match_addr is required".to_string());
    }

    info!(match_addr = %payload.match_addr, "match-settled received");
    forward(&state, ExternalEvent::MatchSettled(payload.into())).await
}
