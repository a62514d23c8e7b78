//! Vitals push, history, and the live WebSocket surface.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use cardio_core::constants::LIVE_FEED_INTERVAL_MS;
use cardio_core::{StoredVitalReading, VitalReading};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/push", post(push))
        .route("/history", get(history))
        .route("/ws/vitals/{patient}", get(ws_vitals))
}

/// Direct HTTP fallback bypassing the telemetry channel. Unlike channel
/// ingestion, validation failures surface to the caller.
async fn push(
    State(state): State<AppState>,
    Json(reading): Json<VitalReading>,
) -> Result<Json<Value>, ApiError> {
    state.ingestor.admit(reading)?;
    Ok(Json(json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    patient: String,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    limit: Option<usize>,
}

async fn history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<StoredVitalReading>>, ApiError> {
    let store = state.history;
    let rows = tokio::task::spawn_blocking(move || {
        store.query(&q.patient, q.start, q.end, q.limit)
    })
    .await
    .map_err(|e| cardio_core::errors::to_storage_err(e.to_string()))??;
    Ok(Json(rows))
}

/// Live vitals for one patient: the latest cached reading, sampled once
/// per second until the observer disconnects. A sampling surface — bursts
/// faster than the interval are deliberately skipped.
async fn ws_vitals(
    ws: WebSocketUpgrade,
    Path(patient): Path<String>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| stream_vitals(socket, patient, state))
}

async fn stream_vitals(mut socket: WebSocket, patient: String, state: AppState) {
    let mut ticker =
        tokio::time::interval(std::time::Duration::from_millis(LIVE_FEED_INTERVAL_MS));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(reading) = state.feed.poll(&patient) {
                    let payload = match serde_json::to_string(&reading) {
                        Ok(p) => p,
                        Err(e) => {
                            debug!(patient = %patient, error = %e, "reading not serializable");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
            }
            msg = socket.recv() => {
                // Any close (or transport error) ends the stream.
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }
    debug!(patient = %patient, "live vitals observer disconnected");
}
