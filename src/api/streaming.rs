//! Streaming API endpoints
//!
//! Provides real-time record-change notifications via Server-Sent
//! Events (SSE). Delivery is at-least-once: a lagging client may miss
//! events and should re-fetch; duplicates must be tolerated.

use axum::{
    extract::State,
    response::IntoResponse,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::BroadcastStream;

use crate::AppState;
use crate::auth::{AdminUser, CurrentUser};
use crate::data::RecordChange;
use crate::error::AppError;

fn change_to_event(change: &RecordChange) -> Option<Event> {
    let data = serde_json::to_string(change).ok()?;
    Some(Event::default().event("update").data(data))
}

/// GET /api/v1/streaming/health
/// Health check for streaming endpoint
pub async fn streaming_health() -> impl IntoResponse {
    "OK"
}

/// GET /api/v1/streaming/user
/// Stream changes to the authenticated user's own records
pub async fn stream_user(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let user_id = session.user_id;
    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(move |result| {
        // Lagged receivers drop the missed window; the client re-fetches.
        let change = result.ok()?;
        if change.user_id != user_id {
            return None;
        }
        change_to_event(&change).map(Ok)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /admin/streaming
/// Stream all record changes (admin only)
pub async fn stream_admin(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let stream = BroadcastStream::new(state.events.subscribe())
        .filter_map(|result| change_to_event(&result.ok()?).map(Ok));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
