//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::simulate::{parse_script, replay};
use crate::api::{self, ApiOptions, SessionJson};
use crate::clock::{entropy, now_ms};
use crate::config::Settings;
use countnow_core::{
    CountNowError, CounterEvent, SessionBody, SessionRow, Store,
    codes::{room_code, share_url},
    countdown::format_clock,
    penalty,
    presets::PRESET_LABELS,
    ranking::{rank, winner},
};

/// Attempts at drawing an unused room code.
const ROOM_CODE_ATTEMPTS: usize = 8;

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Open the configured database.
pub fn open_store(settings: &Settings) -> Result<Store, CountNowError> {
    Store::open(&settings.database)
}

fn require_session(store: &Store, code: &str) -> Result<SessionRow, CountNowError> {
    store
        .session(code)?
        .ok_or_else(|| CountNowError::NotFound(format!("session {}", code)))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(settings: &Settings) -> Result<(), CountNowError> {
    let store = open_store(settings)?;

    println!("CountNow Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", settings.host);
    println!("  Port:       {}", settings.port);
    println!("  Database:   {:?}", settings.database);
    println!("  Public URL: {}", settings.public_url);
    println!();
    println!("Endpoints:");
    println!("  GET  /sessions              - Recent sessions");
    println!("  PUT  /sessions/{{code}}       - Save a session");
    println!("  GET  /sessions/{{code}}/events - Realtime feed");
    println!("  POST /sessions/new          - New room code");
    println!("  GET  /health                - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&settings.bind_addr(), store, ApiOptions::from_settings(settings)).await
}

// =============================================================================
// SESSION COMMANDS
// =============================================================================

fn describe(row: &SessionRow) -> String {
    match &row.session.body {
        SessionBody::Solo { count } => format!("solo  count={}", count),
        SessionBody::Multi { players } => {
            format!("multi players={} total={}", players.len(), row.session.total())
        }
    }
}

/// List the most recently updated sessions.
pub fn cmd_sessions_list(settings: &Settings, json_mode: bool) -> Result<(), CountNowError> {
    let store = open_store(settings)?;
    let rows = store.recent_sessions();

    if json_mode {
        let sessions: Vec<SessionJson> = rows.into_iter().map(SessionJson::from).collect();
        print_json(&serde_json::json!({ "sessions": sessions }));
        return Ok(());
    }

    println!("Recent Sessions");
    println!("===============");
    if rows.is_empty() {
        println!("(none)");
    }
    for row in &rows {
        let title = row.session.title.as_deref().unwrap_or("-");
        println!(
            "{}  {}  {}  updated {}",
            row.code(),
            describe(row),
            title,
            api::to_datetime(row.updated_at).to_rfc3339()
        );
    }
    Ok(())
}

/// Show one session.
pub fn cmd_session_show(settings: &Settings, json_mode: bool, code: &str) -> Result<(), CountNowError> {
    let store = open_store(settings)?;
    let row = require_session(&store, code)?;

    if json_mode {
        print_json(&serde_json::json!(SessionJson::from(row)));
        return Ok(());
    }

    println!("Session {}", row.code());
    println!("Title:   {}", row.session.title.as_deref().unwrap_or("-"));
    println!("Kind:    {}", row.session.kind());
    println!("Created: {}", api::to_datetime(row.created_at).to_rfc3339());
    println!("Updated: {}", api::to_datetime(row.updated_at).to_rfc3339());
    match &row.session.body {
        SessionBody::Solo { count } => println!("Count:   {}", count),
        SessionBody::Multi { players } => {
            println!();
            for player in players {
                println!("  {:<24} {}", player.label(), player.count);
            }
        }
    }
    Ok(())
}

/// Delete one session.
pub fn cmd_session_delete(settings: &Settings, code: &str) -> Result<(), CountNowError> {
    let mut store = open_store(settings)?;
    if !store.delete_session(code)? {
        return Err(CountNowError::NotFound(format!("session {}", code)));
    }
    println!("Deleted session {}", code);
    Ok(())
}

/// Remove sessions not updated within the last hour.
pub fn cmd_sessions_clear(settings: &Settings, json_mode: bool) -> Result<(), CountNowError> {
    let mut store = open_store(settings)?;
    let removed = store.clear_stale_sessions(now_ms())?;

    if json_mode {
        print_json(&serde_json::json!({ "removed": removed }));
    } else {
        println!("Removed {} stale session(s)", removed.len());
    }
    Ok(())
}

// =============================================================================
// RESULTS COMMAND
// =============================================================================

/// Print ranked results for a multi session.
pub fn cmd_results(settings: &Settings, json_mode: bool, code: &str) -> Result<(), CountNowError> {
    let store = open_store(settings)?;
    let row = require_session(&store, code)?;
    let SessionBody::Multi { players } = &row.session.body else {
        return Err(CountNowError::InvalidInput(format!(
            "session {} is a solo count",
            code
        )));
    };
    let results = rank(players);

    if json_mode {
        print_json(&serde_json::json!({
            "code": code,
            "total": row.session.total(),
            "results": results,
            "winner": winner(&results),
        }));
        return Ok(());
    }

    println!("Results for {}", code);
    println!("================");
    for result in &results {
        println!(
            "{:>2}. {} {:<20} {:>5}  {:>3}%",
            result.rank, result.emoji, result.name, result.count, result.bar_percent
        );
    }
    println!();
    println!("Total: {}", row.session.total());
    if let Some(top) = winner(&results) {
        println!("Winner: {} {}", top.emoji, top.name);
    }
    Ok(())
}

// =============================================================================
// CATALOG COMMANDS
// =============================================================================

/// Draw a penalty.
pub fn cmd_penalty(json_mode: bool) -> Result<(), CountNowError> {
    let drawn = penalty::draw(entropy());
    if json_mode {
        print_json(&serde_json::json!({ "penalty": drawn }));
    } else {
        println!("{}", drawn);
    }
    Ok(())
}

/// List preset participant labels.
pub fn cmd_presets(json_mode: bool) -> Result<(), CountNowError> {
    if json_mode {
        print_json(&serde_json::json!({ "presets": PRESET_LABELS }));
        return Ok(());
    }

    for label in &PRESET_LABELS {
        println!("{:<10} {} {:<12} {}", label.id, label.emoji, label.name, label.color);
    }
    Ok(())
}

/// Allocate an unused room code.
pub fn cmd_new_room(settings: &Settings, json_mode: bool) -> Result<(), CountNowError> {
    let store = open_store(settings)?;
    for _ in 0..ROOM_CODE_ATTEMPTS {
        let code = room_code(entropy());
        if store.session(&code)?.is_some() {
            continue;
        }
        let url = share_url(&settings.public_url, &code);
        if json_mode {
            print_json(&serde_json::json!({ "code": code, "share_url": url }));
        } else {
            println!("Room code: {}", code);
            println!("Share:     {}", url);
        }
        return Ok(());
    }
    Err(CountNowError::Conflict(
        "could not allocate a free room code".to_string(),
    ))
}

// =============================================================================
// SIMULATE COMMAND
// =============================================================================

/// Replay a script and print what the counter emitted.
pub fn cmd_simulate(json_mode: bool, script: &str, settle_ms: u64) -> Result<(), CountNowError> {
    let steps = parse_script(script)?;
    let outcome = replay(&steps, settle_ms);

    if json_mode {
        print_json(&serde_json::json!(outcome));
        return Ok(());
    }

    println!("Replay ({} steps)", steps.len());
    println!("================");
    for emitted in &outcome.events {
        let sign = match emitted.event {
            CounterEvent::Increment => "+1",
            CounterEvent::Decrement => "-1",
        };
        println!(
            "{:>7} ms  {}  count={}",
            emitted.at_ms, sign, emitted.count
        );
    }
    println!();
    println!(
        "Final count: {} (ended at {})",
        outcome.final_count,
        format_clock(outcome.ended_at_ms / 1_000)
    );
    Ok(())
}
