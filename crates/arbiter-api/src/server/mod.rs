use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    ApiError, Decision, ErrorCode, Event, EventType, Proposal, RoundState, SessionConfig,
    SCHEMA_VERSION_V1,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Mutex};
use tracing::info;

use crate::{EngineApi, PersistenceError};

const DEFAULT_PAGE_SIZE: usize = 500;
const MAX_PAGE_SIZE: usize = 5000;
const DEFAULT_SQLITE_PATH: &str = "arbiter_sessions.sqlite";

include!("error.rs");
include!("state.rs");
include!("routes/control.rs");
include!("routes/query.rs");
include!("routes/stream.rs");
include!("util.rs");

#[cfg(test)]
mod tests;

pub async fn serve(addr: SocketAddr) -> Result<(), ServerError> {
    let state = AppState::new();
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("arbitration api listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/sessions", post(create_session).get(list_sessions))
        .route("/api/v1/sessions/{session_id}/state", get(get_state))
        .route(
            "/api/v1/sessions/{session_id}/proposals",
            post(submit_proposal),
        )
        .route("/api/v1/sessions/{session_id}/resolve", post(resolve_round))
        .route("/api/v1/sessions/{session_id}/abort", post(abort_round))
        .route(
            "/api/v1/sessions/{session_id}/suggestions",
            get(get_suggestions),
        )
        .route(
            "/api/v1/sessions/{session_id}/decisions",
            get(get_decisions),
        )
        .route("/api/v1/sessions/{session_id}/events", get(get_events))
        .route("/api/v1/sessions/{session_id}/stream", get(stream_session))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}
