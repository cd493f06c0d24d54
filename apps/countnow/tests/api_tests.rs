//! Integration tests for the CountNow HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use countnow::api::{
    ApiOptions, AppState, ClearResponse, ErrorResponse, HealthResponse, NewRoomResponse,
    ParticipantJson, ParticipantListResponse, PenaltyResponse, ProfileJson, ResultsResponse,
    SessionJson, SessionKind, SessionListResponse, TimersResponse, create_router,
};
use countnow_core::{ChangeKind, PENALTIES, Store};
use serde_json::json;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn test_options() -> ApiOptions {
    ApiOptions {
        api_key: None,
        cors_origins: None,
        rate_limit: 0,
        public_url: "https://countnow.example".to_string(),
    }
}

/// Create a test server over a fresh in-memory store.
fn create_test_server() -> TestServer {
    let state = AppState::new(Store::new(), test_options());
    TestServer::new(create_router(state)).unwrap()
}

fn create_auth_test_server(api_key: &str) -> TestServer {
    let options = ApiOptions {
        api_key: Some(api_key.to_string()),
        ..test_options()
    };
    TestServer::new(create_router(AppState::new(Store::new(), options))).unwrap()
}

fn family_session() -> serde_json::Value {
    json!({
        "type": "multi",
        "title": "Sunday chores",
        "players": [
            { "id": "mom", "name": "Mom", "emoji": "👩", "color": "#FF8A80", "count": 3 },
            { "id": "dad", "name": "Dad", "emoji": "👨", "color": "#80D8FF", "count": 5 },
            { "id": "kid", "name": "Kid", "emoji": "🧒", "color": "#CCFF90", "count": 3 }
        ]
    })
}

// =============================================================================
// CATALOG
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();
    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_presets_endpoint() {
    let server = create_test_server();
    let response = server.get("/presets").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["presets"].as_array().map(Vec::len), Some(24));
    assert_eq!(body["palette"].as_array().map(Vec::len), Some(6));
}

#[tokio::test]
async fn test_timers_endpoint() {
    let server = create_test_server();
    let timers: TimersResponse = server.get("/timers").await.json();

    assert_eq!(timers.options, vec![0, 60, 180, 300, 600]);
    assert_eq!(timers.default, 180);
    assert_eq!(timers.warning_seconds, 30);
}

#[tokio::test]
async fn test_penalty_draw() {
    let server = create_test_server();
    let response = server.post("/penalty").await;

    response.assert_status_ok();
    let drawn: PenaltyResponse = response.json();
    assert!(PENALTIES.contains(&drawn.penalty.as_str()));
}

// =============================================================================
// SESSIONS
// =============================================================================

#[tokio::test]
async fn test_solo_session_round_trip() {
    let server = create_test_server();

    let response = server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "solo", "title": "  Push-ups  ", "count": 12 }))
        .await;
    response.assert_status_ok();
    let saved: SessionJson = response.json();
    assert_eq!(saved.kind, SessionKind::Solo);
    assert_eq!(saved.count, Some(12));
    assert_eq!(saved.title.as_deref(), Some("Push-ups"));
    assert!(saved.players.is_none());

    let fetched: SessionJson = server.get("/sessions/AB12CD").await.json();
    assert_eq!(fetched, saved);
}

#[tokio::test]
async fn test_session_row_shape() {
    let server = create_test_server();
    server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "solo", "count": 1 }))
        .await
        .assert_status_ok();

    let row: serde_json::Value = server.get("/sessions/AB12CD").await.json();
    assert_eq!(row["code"], "AB12CD");
    assert_eq!(row["type"], "solo");
    assert!(row["title"].is_null());
    assert!(row["players"].is_null());
    // RFC 3339 stamps
    let created = row["created_at"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(created).is_ok());
}

#[tokio::test]
async fn test_upsert_keeps_created_at() {
    let server = create_test_server();
    let first: SessionJson = server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "solo", "count": 1 }))
        .await
        .json();
    let second: SessionJson = server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "solo", "count": 2 }))
        .await
        .json();

    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(second.count, Some(2));

    let list: SessionListResponse = server.get("/sessions").await.json();
    assert_eq!(list.sessions.len(), 1);
}

#[tokio::test]
async fn test_multi_session_requires_players() {
    let server = create_test_server();

    let response = server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "multi" }))
        .await;
    response.assert_status_bad_request();
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("players"));

    server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "multi", "players": [] }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_duplicate_player_ids_rejected() {
    let server = create_test_server();
    let response = server
        .put("/sessions/AB12CD")
        .json(&json!({
            "type": "multi",
            "players": [
                { "id": "a", "name": "A", "emoji": "🙋", "color": "#FF8A80", "count": 0 },
                { "id": "a", "name": "B", "emoji": "🙋", "color": "#80D8FF", "count": 0 }
            ]
        }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_missing_session_is_404() {
    let server = create_test_server();
    let response = server.get("/sessions/NOPE00").await;

    response.assert_status_not_found();
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("NOPE00"));
}

#[tokio::test]
async fn test_delete_session() {
    let server = create_test_server();
    server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "solo", "count": 1 }))
        .await
        .assert_status_ok();

    server
        .delete("/sessions/AB12CD")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server.get("/sessions/AB12CD").await.assert_status_not_found();
    server.delete("/sessions/AB12CD").await.assert_status_not_found();
}

#[tokio::test]
async fn test_clear_keeps_fresh_sessions() {
    let server = create_test_server();
    server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "solo", "count": 1 }))
        .await
        .assert_status_ok();

    let cleared: ClearResponse = server.post("/sessions/clear").await.json();
    assert!(cleared.removed.is_empty());
    server.get("/sessions/AB12CD").await.assert_status_ok();
}

#[tokio::test]
async fn test_results_rank_ties() {
    let server = create_test_server();
    server
        .put("/sessions/FAM001")
        .json(&family_session())
        .await
        .assert_status_ok();

    let response = server.get("/sessions/FAM001/results").await;
    response.assert_status_ok();
    let results: ResultsResponse = response.json();

    assert_eq!(results.total, 11);
    let ranks: Vec<u32> = results.results.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 2]);
    assert_eq!(results.results[1].name, "Mom");
    assert_eq!(results.winner.map(|w| w.name), Some("Dad".to_string()));
}

#[tokio::test]
async fn test_results_of_solo_is_bad_request() {
    let server = create_test_server();
    server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "solo", "count": 1 }))
        .await
        .assert_status_ok();

    server
        .get("/sessions/AB12CD/results")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_writes_publish_changes() {
    let state = AppState::new(Store::new(), test_options());
    let mut rx = state.feed.subscribe();
    let server = TestServer::new(create_router(state)).unwrap();

    server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "solo", "count": 1 }))
        .await
        .assert_status_ok();
    server
        .delete("/sessions/AB12CD")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let upserted = rx.recv().await.unwrap();
    assert_eq!(upserted.kind, ChangeKind::Upserted);
    assert_eq!(upserted.code, "AB12CD");
    let deleted = rx.recv().await.unwrap();
    assert_eq!(deleted.kind, ChangeKind::Deleted);
}

#[tokio::test]
async fn test_session_events_stream() {
    let server = create_test_server();
    server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "solo", "count": 1 }))
        .await
        .assert_status_ok();

    let (events, ()) = tokio::join!(async { server.get("/sessions/AB12CD/events").await }, async {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        server
            .put("/sessions/ZZ99ZZ")
            .json(&json!({ "type": "solo", "count": 7 }))
            .await
            .assert_status_ok();
        server
            .put("/sessions/AB12CD")
            .json(&json!({ "type": "solo", "count": 2 }))
            .await
            .assert_status_ok();
        server
            .delete("/sessions/AB12CD")
            .await
            .assert_status(StatusCode::NO_CONTENT);
    });

    events.assert_status_ok();
    let body = events.text();
    let snapshot = body.find("event: snapshot").unwrap();
    let upserted = body.find("event: upserted").unwrap();
    let deleted = body.find("event: deleted").unwrap();
    assert!(snapshot < upserted && upserted < deleted);
    assert_eq!(body.matches("event: upserted").count(), 1);
    assert!(!body.contains("ZZ99ZZ"));
}

#[tokio::test]
async fn test_put_session_rejects_malformed_code() {
    let server = create_test_server();
    for code in ["bad!", "ab12cd", "AB12CDE"] {
        server
            .put(&format!("/sessions/{}", code))
            .json(&json!({ "type": "solo", "count": 1 }))
            .await
            .assert_status_bad_request();
    }
    let list: SessionListResponse = server.get("/sessions").await.json();
    assert!(list.sessions.is_empty());
}

#[tokio::test]
async fn test_put_multi_session_from_presets() {
    let server = create_test_server();
    let response = server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "multi", "presets": ["dad", "cat"] }))
        .await;

    response.assert_status_ok();
    let session: SessionJson = response.json();
    let names: Vec<_> = session
        .players
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Dad".to_string(), "Cat".to_string()]);

    server
        .put("/sessions/AB12CD")
        .json(&json!({ "type": "multi", "presets": ["unicorn"] }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_new_room_code_and_link() {
    let server = create_test_server();
    let response = server.post("/sessions/new").await;

    response.assert_status_ok();
    let room: NewRoomResponse = response.json();
    assert_eq!(room.code.len(), 6);
    assert!(room.code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    assert_eq!(
        room.share_url,
        format!("https://countnow.example/room/{}", room.code)
    );
}

// =============================================================================
// PARTICIPANTS
// =============================================================================

#[tokio::test]
async fn test_participant_lifecycle() {
    let server = create_test_server();

    let response = server
        .post("/users/u1/participants")
        .json(&json!({ "name": " Grandma ", "emoji": "👵", "color": "#FFD180" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: ParticipantJson = response.json();
    assert_eq!(created.name, "Grandma");
    assert_eq!(created.user_id, "u1");
    assert_eq!(created.usage_count, 0);

    let used: ParticipantJson = server
        .post(&format!("/users/u1/participants/{}/use", created.id))
        .await
        .json();
    assert_eq!(used.usage_count, 1);

    let patched: ParticipantJson = server
        .patch(&format!("/users/u1/participants/{}", created.id))
        .json(&json!({ "is_favorite": true }))
        .await
        .json();
    assert!(patched.is_favorite);
    assert_eq!(patched.name, "Grandma");

    server
        .delete(&format!("/users/u1/participants/{}", created.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let list: ParticipantListResponse = server.get("/users/u1/participants").await.json();
    assert!(list.participants.is_empty());
}

#[tokio::test]
async fn test_participants_are_scoped_to_owner() {
    let server = create_test_server();
    let created: ParticipantJson = server
        .post("/users/u1/participants")
        .json(&json!({ "name": "Coach", "emoji": "🙋", "color": "#80D8FF" }))
        .await
        .json();

    let others: ParticipantListResponse = server.get("/users/u2/participants").await.json();
    assert!(others.participants.is_empty());

    server
        .patch(&format!("/users/u2/participants/{}", created.id))
        .json(&json!({ "name": "Hijacked" }))
        .await
        .assert_status_not_found();
    server
        .delete(&format!("/users/u2/participants/{}", created.id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_participant_import() {
    let server = create_test_server();
    let response = server
        .post("/users/u1/participants/import")
        .json(&json!({
            "participants": [
                { "name": "Aunt", "emoji": "👩", "color": "#FF8A80" },
                { "name": "Uncle", "emoji": "👨", "color": "#80D8FF" }
            ]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let list: ParticipantListResponse = server.get("/users/u1/participants").await.json();
    assert_eq!(list.participants.len(), 2);
}

#[tokio::test]
async fn test_blank_participant_name_rejected() {
    let server = create_test_server();
    server
        .post("/users/u1/participants")
        .json(&json!({ "name": "   ", "emoji": "🙋", "color": "#80D8FF" }))
        .await
        .assert_status_bad_request();
}

// =============================================================================
// PROFILES
// =============================================================================

#[tokio::test]
async fn test_profile_lifecycle() {
    let server = create_test_server();
    server.get("/users/u1/profile").await.assert_status_not_found();

    let response = server
        .post("/users/u1/profile")
        .json(&json!({ "email": "sam@example.com", "name": "Sam" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let profile: ProfileJson = response.json();
    assert_eq!(profile.emoji, "😊");
    assert_eq!(profile.color, "#FF6B6B");

    server
        .post("/users/u1/profile")
        .json(&json!({ "email": "sam@example.com", "name": "Sam" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let patched: ProfileJson = server
        .patch("/users/u1/profile")
        .json(&json!({ "display_name": "Sammy" }))
        .await
        .json();
    assert_eq!(patched.display_name.as_deref(), Some("Sammy"));
    assert_eq!(patched.created_at, profile.created_at);
}

#[tokio::test]
async fn test_patch_missing_profile_is_404() {
    let server = create_test_server();
    server
        .patch("/users/ghost/profile")
        .json(&json!({ "name": "Boo" }))
        .await
        .assert_status_not_found();
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let api_key = "test-secret-key-12345";
    let server = create_auth_test_server(api_key);

    let response = server
        .get("/sessions")
        .add_header(
            header::AUTHORIZATION,
            format!("Bearer {}", api_key).parse::<HeaderValue>().unwrap(),
        )
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_valid_raw_token() {
    let api_key = "test-raw-key-67890";
    let server = create_auth_test_server(api_key);

    let response = server
        .get("/sessions")
        .add_header(header::AUTHORIZATION, api_key.parse::<HeaderValue>().unwrap())
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_invalid_token_rejected() {
    let server = create_auth_test_server("correct-key");

    let response = server
        .get("/sessions")
        .add_header(
            header::AUTHORIZATION,
            "Bearer wrong-key".parse::<HeaderValue>().unwrap(),
        )
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let server = create_auth_test_server("correct-key");
    server.get("/sessions").await.assert_status_unauthorized();
}

#[tokio::test]
async fn test_auth_health_always_open() {
    let server = create_auth_test_server("correct-key");
    server.get("/health").await.assert_status_ok();
}
