//! # redb-backed Record Storage
//!
//! One redb table per record kind, keyed by string id, with postcard-encoded
//! values. Every write is its own transaction; batch puts share one.

use super::RecordStore;
use crate::participants::CustomParticipant;
use crate::profile::UserProfile;
use crate::session::SessionRow;
use crate::types::CountNowError;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

type RecordTable = TableDefinition<'static, &'static str, &'static [u8]>;

/// Table for sessions: room code -> serialized SessionRow
const SESSIONS: RecordTable = TableDefinition::new("sessions");

/// Table for custom participants: participant id -> serialized CustomParticipant
const PARTICIPANTS: RecordTable = TableDefinition::new("participants");

/// Table for profiles: user id -> serialized UserProfile
const PROFILES: RecordTable = TableDefinition::new("profiles");

fn io_err(e: impl std::fmt::Display) -> CountNowError {
    CountNowError::IoError(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CountNowError> {
    postcard::to_allocvec(value).map_err(|e| CountNowError::SerializationError(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CountNowError> {
    postcard::from_bytes(bytes).map_err(|e| CountNowError::SerializationError(e.to_string()))
}

/// A disk-backed record store using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CountNowError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            for table in [SESSIONS, PARTICIPANTS, PROFILES] {
                let _ = write_txn.open_table(table).map_err(io_err)?;
            }
            write_txn.commit().map_err(io_err)?;
        }

        tracing::debug!(path = %path.as_ref().display(), "record store opened");
        Ok(Self { db })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), CountNowError> {
        self.db.compact().map_err(io_err)?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, table: RecordTable, key: &str) -> Result<Option<T>, CountNowError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(table).map_err(io_err)?;
        match table.get(key).map_err(io_err)? {
            Some(guard) => decode(guard.value()).map(Some),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(&mut self, table: RecordTable, key: &str, value: &T) -> Result<(), CountNowError> {
        let bytes = encode(value)?;
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(table).map_err(io_err)?;
            table.insert(key, bytes.as_slice()).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn put_all<'a, T: Serialize + 'a>(
        &mut self,
        table: RecordTable,
        records: impl IntoIterator<Item = (&'a str, &'a T)>,
    ) -> Result<usize, CountNowError> {
        let encoded = records
            .into_iter()
            .map(|(key, value)| encode(value).map(|bytes| (key, bytes)))
            .collect::<Result<Vec<_>, _>>()?;
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(table).map_err(io_err)?;
            for (key, bytes) in &encoded {
                table.insert(*key, bytes.as_slice()).map_err(io_err)?;
            }
        }
        write_txn.commit().map_err(io_err)?;
        Ok(encoded.len())
    }

    fn remove(&mut self, table: RecordTable, key: &str) -> Result<bool, CountNowError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let existed = {
            let mut table = write_txn.open_table(table).map_err(io_err)?;
            let removed = table.remove(key).map_err(io_err)?;
            removed.is_some()
        };
        write_txn.commit().map_err(io_err)?;
        Ok(existed)
    }

    fn scan<T: DeserializeOwned>(&self, table: RecordTable) -> Result<Vec<T>, CountNowError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(table).map_err(io_err)?;
        let mut out = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            out.push(decode(value.value())?);
        }
        Ok(out)
    }
}

impl RecordStore for RedbStore {
    fn get_session(&self, code: &str) -> Result<Option<SessionRow>, CountNowError> {
        self.get(SESSIONS, code)
    }

    fn put_session(&mut self, row: &SessionRow) -> Result<(), CountNowError> {
        self.put(SESSIONS, &row.session.code, row)
    }

    fn delete_session(&mut self, code: &str) -> Result<bool, CountNowError> {
        self.remove(SESSIONS, code)
    }

    fn sessions(&self) -> Result<Vec<SessionRow>, CountNowError> {
        self.scan(SESSIONS)
    }

    fn get_participant(&self, id: &str) -> Result<Option<CustomParticipant>, CountNowError> {
        self.get(PARTICIPANTS, id)
    }

    fn put_participant(&mut self, participant: &CustomParticipant) -> Result<(), CountNowError> {
        self.put(PARTICIPANTS, &participant.id, participant)
    }

    fn put_participants(&mut self, participants: &[CustomParticipant]) -> Result<(), CountNowError> {
        let written = self.put_all(PARTICIPANTS, participants.iter().map(|p| (p.id.as_str(), p)))?;
        tracing::debug!(written, "participant batch committed");
        Ok(())
    }

    fn delete_participant(&mut self, id: &str) -> Result<bool, CountNowError> {
        self.remove(PARTICIPANTS, id)
    }

    fn participants(&self) -> Result<Vec<CustomParticipant>, CountNowError> {
        self.scan(PARTICIPANTS)
    }

    fn get_profile(&self, id: &str) -> Result<Option<UserProfile>, CountNowError> {
        self.get(PROFILES, id)
    }

    fn put_profile(&mut self, profile: &UserProfile) -> Result<(), CountNowError> {
        self.put(PROFILES, &profile.id, profile)
    }
}

// =============================================================================
// TESTS
// =============================================================================
