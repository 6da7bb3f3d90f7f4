use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use deckbridge_core::events::TriggerEvent;

use crate::server::AppState;

/// Decode a trigger request into at most one event and broadcast it.
///
/// The response is `ok` regardless of what was recognized or how many
/// subscribers exist — a trigger with nobody listening is not an error.
pub async fn trigger(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if let Some(event) = decode_trigger(&params) {
        let delivered = state.broadcaster.broadcast(event);
        tracing::debug!(delivered, "Trigger broadcast");
    }
    ([(header::CONTENT_TYPE, "text/plain")], "ok")
}

/// Map query parameters to an event. Fixed priority: animal index, then
/// music toggle, then skip, then rain toggle; only the first present
/// parameter is honored. An `a` value that is not a non-negative integer
/// consumes the request without producing an event.
pub(crate) fn decode_trigger(params: &HashMap<String, String>) -> Option<TriggerEvent> {
    if let Some(raw) = params.get("a") {
        return raw.parse().ok().map(|idx| TriggerEvent::Animal { idx });
    }
    if params.contains_key("music") {
        return Some(TriggerEvent::MusicToggle);
    }
    if params.contains_key("skip") {
        return Some(TriggerEvent::NextSong);
    }
    if params.contains_key("rain") {
        return Some(TriggerEvent::RainToggle);
    }
    None
}

/// Serve the game page, read from disk on every request so it can be edited
/// without restarting the bridge.
pub async fn game_page(State(state): State<AppState>) -> Response {
    match tokio::fs::read(state.page_path.as_ref()).await {
        Ok(body) => {
            ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], body).into_response()
        }
        Err(e) => {
            tracing::warn!(path = %state.page_path.display(), error = %e, "Game page not readable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
