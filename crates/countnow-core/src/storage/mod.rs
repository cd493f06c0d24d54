//! # Record Storage
//!
//! Keyed storage for sessions, custom participants and profiles.
//!
//! `RecordStore` only gets, puts, deletes and scans each record kind.
//! Ordering, ownership checks and stamps live in [`crate::store`].
//!
//! - `MemoryStore`: `BTreeMap`s, volatile
//! - `RedbStore`: redb tables, postcard-encoded values

mod redb_store;

pub use redb_store::RedbStore;

use crate::participants::CustomParticipant;
use crate::profile::UserProfile;
use crate::session::SessionRow;
use crate::types::CountNowError;
use std::collections::BTreeMap;

/// Storage operations shared by every backend.
pub trait RecordStore {
    fn get_session(&self, code: &str) -> Result<Option<SessionRow>, CountNowError>;
    fn put_session(&mut self, row: &SessionRow) -> Result<(), CountNowError>;
    /// Returns whether a row was removed.
    fn delete_session(&mut self, code: &str) -> Result<bool, CountNowError>;
    fn sessions(&self) -> Result<Vec<SessionRow>, CountNowError>;

    fn get_participant(&self, id: &str) -> Result<Option<CustomParticipant>, CountNowError>;
    fn put_participant(&mut self, participant: &CustomParticipant) -> Result<(), CountNowError>;
    /// Write every participant or none of them.
    fn put_participants(&mut self, participants: &[CustomParticipant]) -> Result<(), CountNowError>;
    fn delete_participant(&mut self, id: &str) -> Result<bool, CountNowError>;
    fn participants(&self) -> Result<Vec<CustomParticipant>, CountNowError>;

    fn get_profile(&self, id: &str) -> Result<Option<UserProfile>, CountNowError>;
    fn put_profile(&mut self, profile: &UserProfile) -> Result<(), CountNowError>;
}

/// Volatile store backed by ordered maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sessions: BTreeMap<String, SessionRow>,
    participants: BTreeMap<String, CustomParticipant>,
    profiles: BTreeMap<String, UserProfile>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get_session(&self, code: &str) -> Result<Option<SessionRow>, CountNowError> {
        Ok(self.sessions.get(code).cloned())
    }

    fn put_session(&mut self, row: &SessionRow) -> Result<(), CountNowError> {
        self.sessions.insert(row.session.code.clone(), row.clone());
        Ok(())
    }

    fn delete_session(&mut self, code: &str) -> Result<bool, CountNowError> {
        Ok(self.sessions.remove(code).is_some())
    }

    fn sessions(&self) -> Result<Vec<SessionRow>, CountNowError> {
        Ok(self.sessions.values().cloned().collect())
    }

    fn get_participant(&self, id: &str) -> Result<Option<CustomParticipant>, CountNowError> {
        Ok(self.participants.get(id).cloned())
    }

    fn put_participant(&mut self, participant: &CustomParticipant) -> Result<(), CountNowError> {
        self.participants
            .insert(participant.id.clone(), participant.clone());
        Ok(())
    }

    fn put_participants(&mut self, participants: &[CustomParticipant]) -> Result<(), CountNowError> {
        for participant in participants {
            self.participants
                .insert(participant.id.clone(), participant.clone());
        }
        Ok(())
    }

    fn delete_participant(&mut self, id: &str) -> Result<bool, CountNowError> {
        Ok(self.participants.remove(id).is_some())
    }

    fn participants(&self) -> Result<Vec<CustomParticipant>, CountNowError> {
        Ok(self.participants.values().cloned().collect())
    }

    fn get_profile(&self, id: &str) -> Result<Option<UserProfile>, CountNowError> {
        Ok(self.profiles.get(id).cloned())
    }

    fn put_profile(&mut self, profile: &UserProfile) -> Result<(), CountNowError> {
        self.profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }
}
