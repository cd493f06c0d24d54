//! # CountNow HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /presets` - Preset labels, palette and emoji choices
//! - `GET /timers` - Countdown options
//! - `GET /sessions` - Recently updated sessions
//! - `POST /sessions/clear` - Remove sessions idle for over an hour
//! - `POST /sessions/new` - Allocate a room code and share link
//! - `GET|PUT|DELETE /sessions/{code}` - One saved session
//! - `GET /sessions/{code}/results` - Ranked results of a multi session
//! - `GET /sessions/{code}/events` - SSE feed of changes to a session
//! - `POST /penalty` - Draw a penalty
//! - `/users/{user_id}/participants[...]` - Saved participants
//! - `/users/{user_id}/profile` - Account profile
//!
//! ## Security Configuration
//!
//! Comes from [`crate::config::Settings`]: `cors_origins`, `rate_limit` and
//! `api_key`.

mod auth;
mod handlers;
mod middleware;
mod realtime;
mod types;

pub use auth::keys_match;
pub use middleware::create_rate_limiter;
pub use realtime::SessionFeed;
pub use types::{
    ClearResponse, ErrorResponse, HealthResponse, ImportRequest, NewRoomResponse, ParticipantJson,
    ParticipantListResponse, PenaltyResponse, ProfileJson, ResultsResponse, SessionInput,
    SessionJson, SessionKind, SessionListResponse, TimersResponse, to_datetime,
};

use crate::config::Settings;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use countnow_core::{CountNowError, Store};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request body cap.
const BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Security and link settings the router needs.
#[derive(Debug, Clone)]
pub struct ApiOptions {
    pub api_key: Option<String>,
    /// Comma-separated origins, `*` for any, `None` for localhost only.
    pub cors_origins: Option<String>,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// Base of generated share links.
    pub public_url: String,
}

impl Default for ApiOptions {
    fn default() -> Self {
        let settings = Settings::default();
        Self::from_settings(&settings)
    }
}

impl ApiOptions {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            cors_origins: settings.cors_origins.clone(),
            rate_limit: settings.rate_limit,
            public_url: settings.public_url.clone(),
        }
    }
}

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    pub feed: SessionFeed,
    pub options: Arc<ApiOptions>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Store, options: ApiOptions) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            feed: SessionFeed::new(),
            options: Arc::new(options),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS layer from the configured origins.
///
/// - `*`: allows all origins
/// - unset: localhost only
/// - otherwise: the comma-separated list
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (cors_origins = \"*\")");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(CORS_METHODS)
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit, rate
/// limiting (if enabled), authentication (if configured).
pub fn create_router(state: AppState) -> Router {
    let options = Arc::clone(&state.options);
    let cors = build_cors_layer(options.cors_origins.as_deref());

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/presets", get(handlers::presets_handler))
        .route("/timers", get(handlers::timers_handler))
        .route("/penalty", post(handlers::penalty_handler))
        .route("/sessions", get(handlers::list_sessions_handler))
        .route("/sessions/clear", post(handlers::clear_sessions_handler))
        .route("/sessions/new", post(handlers::new_room_handler))
        .route(
            "/sessions/{code}",
            get(handlers::get_session_handler)
                .put(handlers::put_session_handler)
                .delete(handlers::delete_session_handler),
        )
        .route("/sessions/{code}/results", get(handlers::results_handler))
        .route("/sessions/{code}/events", get(handlers::session_events_handler))
        .route(
            "/users/{user_id}/participants",
            get(handlers::list_participants_handler).post(handlers::create_participant_handler),
        )
        .route(
            "/users/{user_id}/participants/import",
            post(handlers::import_participants_handler),
        )
        .route(
            "/users/{user_id}/participants/{id}",
            patch(handlers::update_participant_handler)
                .delete(handlers::delete_participant_handler),
        )
        .route(
            "/users/{user_id}/participants/{id}/use",
            post(handlers::use_participant_handler),
        )
        .route(
            "/users/{user_id}/profile",
            get(handlers::get_profile_handler)
                .post(handlers::create_profile_handler)
                .patch(handlers::update_profile_handler),
        );

    match options.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => {
            tracing::info!("API key authentication enabled");
            let expected: Arc<str> = Arc::from(key);
            router = router.layer(axum_middleware::from_fn_with_state(
                expected,
                auth::api_key_auth_middleware,
            ));
        }
        None => {
            tracing::warn!("API key authentication DISABLED - all endpoints are publicly accessible");
        }
    }

    if options.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", options.rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(options.rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and serve until Ctrl-C.
pub async fn run_server(addr: &str, store: Store, options: ApiOptions) -> Result<(), CountNowError> {
    let persistent = store.is_persistent();
    let router = create_router(AppState::new(store, options));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CountNowError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!(persistent, "CountNow HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CountNowError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
