//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Stored records carry unix-millisecond stamps; on the wire every stamp is
//! RFC 3339.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, TimeZone, Utc};
use countnow_core::{
    CountNowError, CountSession, CustomParticipant, NewParticipant, Player, PresetLabel,
    RankedResult, SessionBody, SessionRow, UserProfile, presets::players_from_presets,
};
use serde::{Deserialize, Serialize};

/// Unix milliseconds to a UTC timestamp. Out-of-range values clamp to the epoch.
#[must_use]
pub fn to_datetime(ms: u64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms as i64)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A core error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CountNowError);

impl From<CountNowError> for ApiError {
    fn from(e: CountNowError) -> Self {
        Self(e)
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.0 {
            CountNowError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CountNowError::NotFound(_) => StatusCode::NOT_FOUND,
            CountNowError::Conflict(_) => StatusCode::CONFLICT,
            CountNowError::SerializationError(_) | CountNowError::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// CATALOG RESPONSES
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PresetsResponse {
    pub presets: &'static [PresetLabel],
    pub palette: &'static [&'static str],
    pub emojis: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimersResponse {
    /// Countdown choices in seconds; 0 means no limit.
    pub options: Vec<u32>,
    pub default: u32,
    pub warning_seconds: u32,
}

// =============================================================================
// SESSIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Solo,
    Multi,
}

/// Stored session as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionJson {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub title: Option<String>,
    /// Solo count, `null` for multi sessions.
    pub count: Option<u32>,
    /// Multi roster, `null` for solo sessions.
    pub players: Option<Vec<Player>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionRow> for SessionJson {
    fn from(row: SessionRow) -> Self {
        let (kind, count, players) = match row.session.body {
            SessionBody::Solo { count } => (SessionKind::Solo, Some(count), None),
            SessionBody::Multi { players } => (SessionKind::Multi, None, Some(players)),
        };
        Self {
            code: row.session.code,
            kind,
            title: row.session.title,
            count,
            players,
            created_at: to_datetime(row.created_at),
            updated_at: to_datetime(row.updated_at),
        }
    }
}

/// Body of `PUT /sessions/{code}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInput {
    #[serde(rename = "type")]
    pub kind: SessionKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub players: Option<Vec<Player>>,
    /// Preset label ids to seat when `players` is absent.
    #[serde(default)]
    pub presets: Option<Vec<String>>,
}

impl SessionInput {
    /// Build the core session for `code`. Solo counts default to 0; multi
    /// sessions need a roster, given directly or as preset label ids.
    pub fn into_session(self, code: &str) -> Result<CountSession, CountNowError> {
        match self.kind {
            SessionKind::Solo => Ok(CountSession::solo(code, self.title, self.count.unwrap_or(0))),
            SessionKind::Multi => {
                let players = match (self.players, self.presets) {
                    (Some(players), _) => players,
                    (None, Some(ids)) => {
                        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
                        players_from_presets(&ids)?
                    }
                    (None, None) => {
                        return Err(CountNowError::InvalidInput(
                            "multi session requires players".to_string(),
                        ));
                    }
                };
                Ok(CountSession::multi(code, self.title, players))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub code: String,
    pub total: u64,
    pub results: Vec<RankedResult>,
    pub winner: Option<RankedResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoomResponse {
    pub code: String,
    pub share_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyResponse {
    pub penalty: String,
}

// =============================================================================
// PARTICIPANTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantJson {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub is_favorite: bool,
    pub usage_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomParticipant> for ParticipantJson {
    fn from(p: CustomParticipant) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            name: p.name,
            emoji: p.emoji,
            color: p.color,
            is_favorite: p.is_favorite,
            usage_count: p.usage_count,
            created_at: to_datetime(p.created_at),
            updated_at: to_datetime(p.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantListResponse {
    pub participants: Vec<ParticipantJson>,
}

/// Body of `POST /users/{user_id}/participants/import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub participants: Vec<NewParticipant>,
}

// =============================================================================
// PROFILES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileJson {
    pub id: String,
    pub email: String,
    pub name: String,
    pub display_name: Option<String>,
    pub emoji: String,
    pub color: String,
    pub avatar_url: Option<String>,
    pub referral_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for ProfileJson {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            name: p.name,
            display_name: p.display_name,
            emoji: p.emoji,
            color: p.color,
            avatar_url: p.avatar_url,
            referral_code: p.referral_code,
            created_at: to_datetime(p.created_at),
            updated_at: to_datetime(p.updated_at),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
