//! # Store
//!
//! Record operations over a storage backend: session upsert/list/clear,
//! per-user custom participants and profiles.
//!
//! ## Storage Backends
//!
//! - `InMemory`: `MemoryStore` (fast, volatile)
//! - `Persistent`: `RedbStore` (disk-backed, ACID)
//!
//! Timestamps are passed in as unix milliseconds; the store never reads a
//! clock.

use crate::participants::{CustomParticipant, NewParticipant, ParticipantPatch, sort_by_usage};
use crate::primitives::{CLEAR_SESSIONS_AGE, MAX_IMPORT_BATCH};
use crate::profile::{NewProfile, ProfilePatch, UserProfile};
use crate::session::{CountSession, SessionRow, most_recent};
use crate::storage::{MemoryStore, RecordStore, RedbStore};
use crate::types::CountNowError;
use std::path::Path;

// =============================================================================
// ERROR LOGGING HELPERS
// =============================================================================

/// Log a storage error and fall back to the default value.
#[inline]
fn log_and_default<T: Default>(result: Result<T, CountNowError>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "storage error in {}", context);
            T::default()
        }
    }
}

/// Storage backend for a Store.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory maps (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

#[derive(Debug, Default)]
pub struct Store {
    backend: StorageBackend,
}

impl Store {
    /// Create an in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open or create a persistent store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CountNowError> {
        Ok(Self {
            backend: StorageBackend::Persistent(RedbStore::open(path)?),
        })
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    fn records(&self) -> &dyn RecordStore {
        match &self.backend {
            StorageBackend::InMemory(m) => m,
            StorageBackend::Persistent(r) => r,
        }
    }

    fn records_mut(&mut self) -> &mut dyn RecordStore {
        match &mut self.backend {
            StorageBackend::InMemory(m) => m,
            StorageBackend::Persistent(r) => r,
        }
    }

    // -------------------------------------------------------------------------
    // Sessions
    // -------------------------------------------------------------------------

    /// Insert or replace the session with the same code.
    pub fn upsert_session(&mut self, session: CountSession, now_ms: u64) -> Result<SessionRow, CountNowError> {
        let session = session.validate()?;
        let previous = self.records().get_session(&session.code)?;
        let row = SessionRow::upsert(previous.as_ref(), session, now_ms);
        self.records_mut().put_session(&row)?;
        tracing::debug!(code = %row.session.code, kind = row.session.kind(), "session saved");
        Ok(row)
    }

    pub fn session(&self, code: &str) -> Result<Option<SessionRow>, CountNowError> {
        self.records().get_session(code)
    }

    /// The most recently updated sessions. Storage errors yield an empty list.
    #[must_use]
    pub fn recent_sessions(&self) -> Vec<SessionRow> {
        most_recent(log_and_default(self.records().sessions(), "recent_sessions"))
    }

    pub fn delete_session(&mut self, code: &str) -> Result<bool, CountNowError> {
        self.records_mut().delete_session(code)
    }

    /// Remove every session not updated within `CLEAR_SESSIONS_AGE` of
    /// `now_ms`. Returns the removed codes.
    pub fn clear_stale_sessions(&mut self, now_ms: u64) -> Result<Vec<String>, CountNowError> {
        let cutoff = now_ms.saturating_sub(CLEAR_SESSIONS_AGE.as_millis() as u64);
        let stale: Vec<String> = self
            .records()
            .sessions()?
            .into_iter()
            .filter(|row| row.updated_at < cutoff)
            .map(|row| row.session.code)
            .collect();
        for code in &stale {
            self.records_mut().delete_session(code)?;
        }
        if !stale.is_empty() {
            tracing::info!(removed = stale.len(), "stale sessions cleared");
        }
        Ok(stale)
    }

    // -------------------------------------------------------------------------
    // Custom participants
    // -------------------------------------------------------------------------

    /// A user's participants, most used first.
    pub fn participants_for(&self, user_id: &str) -> Result<Vec<CustomParticipant>, CountNowError> {
        let mut list: Vec<CustomParticipant> = self
            .records()
            .participants()?
            .into_iter()
            .filter(|p| p.user_id == user_id)
            .collect();
        sort_by_usage(&mut list);
        Ok(list)
    }

    fn owned_participant(&self, user_id: &str, id: &str) -> Result<CustomParticipant, CountNowError> {
        self.records()
            .get_participant(id)?
            .filter(|p| p.user_id == user_id)
            .ok_or_else(|| CountNowError::NotFound(format!("participant {}", id)))
    }

    pub fn add_participant(
        &mut self,
        user_id: &str,
        id: &str,
        fields: NewParticipant,
        now_ms: u64,
    ) -> Result<CustomParticipant, CountNowError> {
        if self.records().get_participant(id)?.is_some() {
            return Err(CountNowError::Conflict(format!("participant {} already exists", id)));
        }
        let participant = CustomParticipant::create(id, user_id, fields, now_ms)?;
        self.records_mut().put_participant(&participant)?;
        Ok(participant)
    }

    /// Patch a participant the user owns; others' records are `NotFound`.
    pub fn update_participant(
        &mut self,
        user_id: &str,
        id: &str,
        patch: ParticipantPatch,
        now_ms: u64,
    ) -> Result<CustomParticipant, CountNowError> {
        let mut participant = self.owned_participant(user_id, id)?;
        participant.apply_patch(patch, now_ms)?;
        self.records_mut().put_participant(&participant)?;
        Ok(participant)
    }

    pub fn delete_participant(&mut self, user_id: &str, id: &str) -> Result<(), CountNowError> {
        self.owned_participant(user_id, id)?;
        self.records_mut().delete_participant(id)?;
        Ok(())
    }

    /// Increment a participant's usage count.
    pub fn use_participant(&mut self, user_id: &str, id: &str, now_ms: u64) -> Result<CustomParticipant, CountNowError> {
        let mut participant = self.owned_participant(user_id, id)?;
        participant.record_use(now_ms);
        self.records_mut().put_participant(&participant)?;
        Ok(participant)
    }

    /// Import locally saved participants into a user's account.
    ///
    /// The batch is validated as a whole before anything is written.
    pub fn import_participants(
        &mut self,
        user_id: &str,
        entries: Vec<(String, NewParticipant)>,
        now_ms: u64,
    ) -> Result<Vec<CustomParticipant>, CountNowError> {
        if entries.len() > MAX_IMPORT_BATCH {
            return Err(CountNowError::InvalidInput(format!(
                "import batch of {} exceeds maximum {}",
                entries.len(),
                MAX_IMPORT_BATCH
            )));
        }
        let mut created = Vec::with_capacity(entries.len());
        for (id, fields) in entries {
            if self.records().get_participant(&id)?.is_some()
                || created.iter().any(|p: &CustomParticipant| p.id == id)
            {
                return Err(CountNowError::Conflict(format!("participant {} already exists", id)));
            }
            created.push(CustomParticipant::create(id, user_id, fields, now_ms)?);
        }
        self.records_mut().put_participants(&created)?;
        tracing::info!(user = user_id, imported = created.len(), "participants imported");
        Ok(created)
    }

    // -------------------------------------------------------------------------
    // Profiles
    // -------------------------------------------------------------------------

    pub fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, CountNowError> {
        self.records().get_profile(user_id)
    }

    pub fn create_profile(&mut self, user_id: &str, input: NewProfile, now_ms: u64) -> Result<UserProfile, CountNowError> {
        if self.records().get_profile(user_id)?.is_some() {
            return Err(CountNowError::Conflict(format!("profile {} already exists", user_id)));
        }
        let profile = UserProfile::create(user_id, input, now_ms)?;
        self.records_mut().put_profile(&profile)?;
        Ok(profile)
    }

    pub fn update_profile(&mut self, user_id: &str, patch: ProfilePatch, now_ms: u64) -> Result<UserProfile, CountNowError> {
        let mut profile = self
            .records()
            .get_profile(user_id)?
            .ok_or_else(|| CountNowError::NotFound(format!("profile {}", user_id)))?;
        profile.apply_patch(patch, now_ms)?;
        self.records_mut().put_profile(&profile)?;
        Ok(profile)
    }
}

// =============================================================================
// TESTS
// =============================================================================
