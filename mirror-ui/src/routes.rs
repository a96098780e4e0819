//! JSON API for driving a session and reading the journal.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use mirror::core::session::{Event, SessionFlowState, apply};
use mirror::core::types::JournalEntry;
use mirror::reflect::trigger_reflection;
use serde::Serialize;
use tracing::{debug, error};

use crate::state::{AppState, Session};

pub type ApiError = (StatusCode, String);

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/session", get(get_session).delete(end_session))
        .route("/session/events", post(post_event))
        .route("/session/reflect", post(post_reflect))
        .route("/entries", get(list_entries))
}

async fn health() -> &'static str {
    "ok"
}

/// GET /api/session - current flow state.
async fn get_session(State(state): State<AppState>) -> Json<SessionFlowState> {
    Json(state.session.lock().await.flow.clone())
}

/// DELETE /api/session - discard the session; the journal is untouched.
async fn end_session(State(state): State<AppState>) -> StatusCode {
    *state.session.lock().await = Session::default();
    debug!("session ended");
    StatusCode::NO_CONTENT
}

/// POST /api/session/events - apply one event and return the new state.
async fn post_event(
    State(state): State<AppState>,
    Json(event): Json<Event>,
) -> Json<SessionFlowState> {
    let mut session = state.session.lock().await;
    session.flow = apply(&session.flow, event);
    session.last_outcome = None;
    Json(session.flow.clone())
}

#[derive(Serialize)]
struct ReflectResponse {
    entry: JournalEntry,
    succeeded: bool,
    error: Option<String>,
}

/// POST /api/session/reflect - generate and save a reflection.
///
/// 409 if the reflection step has not been revealed. Collaborator failures
/// still return 200 with `succeeded: false`; the error text was saved.
async fn post_reflect(State(state): State<AppState>) -> Result<Json<ReflectResponse>, ApiError> {
    let mut session = state.session.lock().await;
    if !session.flow.show_reflection {
        return Err((
            StatusCode::CONFLICT,
            "reflection step not revealed".to_string(),
        ));
    }
    let outcome = trigger_reflection(
        &session.flow,
        state.reflector.as_ref(),
        &state.store,
        (state.today)(),
    )
    .await
    .map_err(internal)?;

    let response = ReflectResponse {
        entry: outcome.entry.clone(),
        succeeded: outcome.succeeded(),
        error: outcome.error.as_ref().map(ToString::to_string),
    };
    session.last_outcome = Some(outcome);
    Ok(Json(response))
}

#[derive(Serialize)]
struct EntriesResponse {
    columns: Vec<String>,
    entries: Vec<JournalEntry>,
}

/// GET /api/entries - the full journal, reloaded from disk.
async fn list_entries(State(state): State<AppState>) -> Result<Json<EntriesResponse>, ApiError> {
    let journal = state.store.load_all().map_err(internal)?;
    Ok(Json(EntriesResponse {
        columns: journal.columns,
        entries: journal.entries,
    }))
}

pub fn internal<E: std::fmt::Display>(err: E) -> ApiError {
    let message = format!("{err:#}");
    error!(error = %message, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, message)
}
