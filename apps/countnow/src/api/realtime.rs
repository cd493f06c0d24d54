//! # Realtime Session Feed
//!
//! Every stored session change is broadcast to subscribers; the SSE endpoint
//! forwards the changes for one room code to a connected client.
//!
//! Events on the stream:
//! - `snapshot`: the stored row at subscribe time (if any)
//! - `upserted`: the new row after a save
//! - `deleted`: `{ "code": ... }` after a delete or clear; the stream ends
//!   after it
//!
//! Writers publish while still holding the store's write lock, and readers
//! subscribe before taking their snapshot under the read lock, so a client
//! never misses a change or sees two changes out of order.

use super::types::SessionJson;
use axum::response::sse::Event;
use countnow_core::{ChangeKind, SessionChange, SessionRow};
use serde_json::json;
use std::convert::Infallible;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::ReceiverStream;

/// Buffered changes per subscriber before it starts lagging.
const FEED_CAPACITY: usize = 256;

/// Events queued between the forwarder and one SSE connection.
const STREAM_BUFFER: usize = 16;

/// Fan-out of session changes.
#[derive(Debug, Clone)]
pub struct SessionFeed {
    tx: broadcast::Sender<SessionChange>,
}

impl Default for SessionFeed {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }
}

impl SessionFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a change. Having no subscribers is not an error.
    pub fn publish(&self, change: SessionChange) {
        let code = change.code.clone();
        let receivers = self.tx.send(change).unwrap_or(0);
        tracing::debug!(code = %code, receivers, "session change published");
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.tx.subscribe()
    }
}

/// SSE events for `code`: a snapshot of `current`, then every change from
/// `updates` that concerns the code.
///
/// A forwarder task owns the receiver and stops when the client goes away,
/// the feed closes or the session is deleted.
pub fn event_stream(
    mut updates: broadcast::Receiver<SessionChange>,
    code: String,
    current: Option<SessionRow>,
) -> ReceiverStream<Result<Event, Infallible>> {
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);
    tokio::spawn(async move {
        if let Some(event) = current.and_then(|row| row_event("snapshot", row)) {
            if tx.send(Ok(event)).await.is_err() {
                return;
            }
        }
        loop {
            let msg = tokio::select! {
                msg = updates.recv() => msg,
                () = tx.closed() => break,
            };
            match msg {
                Ok(change) if change.concerns(&code) => {
                    let last = change.kind == ChangeKind::Deleted;
                    if let Some(event) = change_event(change) {
                        if tx.send(Ok(event)).await.is_err() {
                            break;
                        }
                    }
                    if last {
                        break;
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(code = %code, skipped, "realtime subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!(code = %code, "realtime subscriber finished");
    });
    ReceiverStream::new(rx)
}

fn row_event(name: &str, row: SessionRow) -> Option<Event> {
    Event::default()
        .event(name)
        .json_data(SessionJson::from(row))
        .ok()
}

fn change_event(change: SessionChange) -> Option<Event> {
    match (change.kind, change.row) {
        (ChangeKind::Upserted, Some(row)) => row_event("upserted", row),
        (ChangeKind::Upserted, None) => None,
        (ChangeKind::Deleted, _) => Event::default()
            .event("deleted")
            .json_data(json!({ "code": change.code }))
            .ok(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
