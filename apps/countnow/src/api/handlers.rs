//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every write to the session table publishes its change on the realtime
//! feed before the store lock is released.

use super::{
    AppState,
    realtime::event_stream,
    types::{
        ApiError, ClearResponse, HealthResponse, ImportRequest, NewRoomResponse,
        ParticipantJson, ParticipantListResponse, PenaltyResponse, PresetsResponse, ProfileJson,
        ResultsResponse, SessionInput, SessionJson, SessionListResponse, TimersResponse,
    },
};
use crate::clock::{entropy, new_id, now_ms};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{KeepAlive, Sse},
    },
};
use countnow_core::{
    CountNowError, NewParticipant, NewProfile, ParticipantPatch, ProfilePatch, SessionBody,
    SessionChange,
    codes::{is_room_code, room_code, share_url},
    penalty,
    presets::{EMOJIS, PALETTE, PRESET_LABELS},
    primitives::{DEFAULT_GAME_SECONDS, TIMER_OPTIONS, WARNING_SECONDS},
    ranking::{rank, winner},
};

/// Attempts at drawing an unused room code before giving up.
const ROOM_CODE_ATTEMPTS: usize = 8;

// =============================================================================
// HEALTH / CATALOG
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

pub async fn presets_handler() -> impl IntoResponse {
    Json(PresetsResponse {
        presets: &PRESET_LABELS,
        palette: &PALETTE,
        emojis: &EMOJIS,
    })
}

pub async fn timers_handler() -> impl IntoResponse {
    Json(TimersResponse {
        options: TIMER_OPTIONS.to_vec(),
        default: DEFAULT_GAME_SECONDS,
        warning_seconds: WARNING_SECONDS,
    })
}

// =============================================================================
// SESSION HANDLERS
// =============================================================================

/// Most recently updated sessions.
pub async fn list_sessions_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.read().await;
    let sessions = store
        .recent_sessions()
        .into_iter()
        .map(SessionJson::from)
        .collect();
    Json(SessionListResponse { sessions })
}

/// Insert or replace a session by code.
pub async fn put_session_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(input): Json<SessionInput>,
) -> Result<Json<SessionJson>, ApiError> {
    if !is_room_code(&code) {
        return Err(CountNowError::InvalidInput(format!("'{}' is not a room code", code)).into());
    }
    let session = input.into_session(&code)?;
    let mut store = state.store.write().await;
    let row = store.upsert_session(session, now_ms())?;
    state.feed.publish(SessionChange::upserted(row.clone()));
    Ok(Json(SessionJson::from(row)))
}

pub async fn get_session_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<SessionJson>, ApiError> {
    let store = state.store.read().await;
    let row = store
        .session(&code)?
        .ok_or_else(|| CountNowError::NotFound(format!("session {}", code)))?;
    Ok(Json(SessionJson::from(row)))
}

pub async fn delete_session_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    if !store.delete_session(&code)? {
        return Err(CountNowError::NotFound(format!("session {}", code)).into());
    }
    state.feed.publish(SessionChange::deleted(code));
    Ok(StatusCode::NO_CONTENT)
}

/// Remove sessions not updated within the last hour.
pub async fn clear_sessions_handler(
    State(state): State<AppState>,
) -> Result<Json<ClearResponse>, ApiError> {
    let mut store = state.store.write().await;
    let removed = store.clear_stale_sessions(now_ms())?;
    for code in &removed {
        state.feed.publish(SessionChange::deleted(code.clone()));
    }
    Ok(Json(ClearResponse { removed }))
}

/// Ranked results for a multi session.
pub async fn results_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let store = state.store.read().await;
    let row = store
        .session(&code)?
        .ok_or_else(|| CountNowError::NotFound(format!("session {}", code)))?;
    let total = row.session.total();
    let SessionBody::Multi { players } = &row.session.body else {
        return Err(CountNowError::InvalidInput(format!("session {} is a solo count", code)).into());
    };
    let results = rank(players);
    let top = winner(&results).cloned();
    Ok(Json(ResultsResponse {
        code,
        total,
        results,
        winner: top,
    }))
}

/// Server-Sent Events feed of changes to one session.
pub async fn session_events_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (updates, current) = {
        let store = state.store.read().await;
        let updates = state.feed.subscribe();
        (updates, store.session(&code)?)
    };
    tracing::info!(code = %code, "realtime subscriber connected");
    let stream = event_stream(updates, code, current);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Allocate an unused room code and its share link.
pub async fn new_room_handler(
    State(state): State<AppState>,
) -> Result<Json<NewRoomResponse>, ApiError> {
    let store = state.store.read().await;
    for _ in 0..ROOM_CODE_ATTEMPTS {
        let code = room_code(entropy());
        if store.session(&code)?.is_none() {
            let share_url = share_url(&state.options.public_url, &code);
            return Ok(Json(NewRoomResponse { code, share_url }));
        }
    }
    Err(CountNowError::Conflict("could not allocate a free room code".to_string()).into())
}

pub async fn penalty_handler() -> impl IntoResponse {
    Json(PenaltyResponse {
        penalty: penalty::draw(entropy()).to_string(),
    })
}

// =============================================================================
// PARTICIPANT HANDLERS
// =============================================================================

pub async fn list_participants_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ParticipantListResponse>, ApiError> {
    let store = state.store.read().await;
    let participants = store
        .participants_for(&user_id)?
        .into_iter()
        .map(ParticipantJson::from)
        .collect();
    Ok(Json(ParticipantListResponse { participants }))
}

pub async fn create_participant_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(fields): Json<NewParticipant>,
) -> Result<(StatusCode, Json<ParticipantJson>), ApiError> {
    let mut store = state.store.write().await;
    let participant = store.add_participant(&user_id, &new_id(), fields, now_ms())?;
    Ok((StatusCode::CREATED, Json(participant.into())))
}

pub async fn update_participant_handler(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, String)>,
    Json(patch): Json<ParticipantPatch>,
) -> Result<Json<ParticipantJson>, ApiError> {
    let mut store = state.store.write().await;
    let participant = store.update_participant(&user_id, &id, patch, now_ms())?;
    Ok(Json(participant.into()))
}

pub async fn delete_participant_handler(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.delete_participant(&user_id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Count one use of a participant in a room.
pub async fn use_participant_handler(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<Json<ParticipantJson>, ApiError> {
    let mut store = state.store.write().await;
    let participant = store.use_participant(&user_id, &id, now_ms())?;
    Ok(Json(participant.into()))
}

/// Move locally saved participants into the user's account.
pub async fn import_participants_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<ImportRequest>,
) -> Result<(StatusCode, Json<ParticipantListResponse>), ApiError> {
    let entries = request
        .participants
        .into_iter()
        .map(|fields| (new_id(), fields))
        .collect();
    let mut store = state.store.write().await;
    let participants = store
        .import_participants(&user_id, entries, now_ms())?
        .into_iter()
        .map(ParticipantJson::from)
        .collect();
    Ok((StatusCode::CREATED, Json(ParticipantListResponse { participants })))
}

// =============================================================================
// PROFILE HANDLERS
// =============================================================================

pub async fn get_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileJson>, ApiError> {
    let store = state.store.read().await;
    let profile = store
        .profile(&user_id)?
        .ok_or_else(|| CountNowError::NotFound(format!("profile {}", user_id)))?;
    Ok(Json(profile.into()))
}

pub async fn create_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(input): Json<NewProfile>,
) -> Result<(StatusCode, Json<ProfileJson>), ApiError> {
    let mut store = state.store.write().await;
    let profile = store.create_profile(&user_id, input, now_ms())?;
    tracing::info!(user = %user_id, "profile created");
    Ok((StatusCode::CREATED, Json(profile.into())))
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<ProfileJson>, ApiError> {
    let mut store = state.store.write().await;
    let profile = store.update_profile(&user_id, patch, now_ms())?;
    Ok(Json(profile.into()))
}
