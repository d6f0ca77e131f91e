//! # redb-backed Character Storage
//!
//! A disk-backed record store using the redb embedded database:
//! - ACID transactions (one write transaction per mutation)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! Records are encoded with postcard. The id counter lives in the
//! metadata table so ids survive restarts and are never reused.

use crate::store::CharacterStore;
use crate::{Character, CharacterAttrs, CharacterId, CatalogueError};
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for records: CharacterId(u64) -> serialized Character bytes
const CHARACTERS: TableDefinition<u64, &[u8]> = TableDefinition::new("characters");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_ID_KEY: &str = "next_id";

fn io_error(e: impl std::fmt::Display) -> CatalogueError {
    CatalogueError::IoError(e.to_string())
}

fn encode(character: &Character) -> Result<Vec<u8>, CatalogueError> {
    postcard::to_allocvec(character).map_err(|e| CatalogueError::SerializationError(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Character, CatalogueError> {
    postcard::from_bytes(bytes).map_err(|e| CatalogueError::SerializationError(e.to_string()))
}

/// A disk-backed character store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Next id to hand out; mirrors the `next_id` metadata entry.
    next_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a character database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let db = Database::create(path.as_ref()).map_err(io_error)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_error)?;
            let _ = write_txn.open_table(CHARACTERS).map_err(io_error)?;
            let _ = write_txn.open_table(METADATA).map_err(io_error)?;
            write_txn.commit().map_err(io_error)?;
        }

        let next_id = {
            let read_txn = db.begin_read().map_err(io_error)?;
            let table = read_txn.open_table(METADATA).map_err(io_error)?;
            table
                .get(NEXT_ID_KEY)
                .map_err(io_error)?
                .map(|v| v.value())
                .unwrap_or(1)
        };

        Ok(Self { db, next_id })
    }
}

// =============================================================================
// CHARACTERSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl CharacterStore for RedbStore {
    fn insert(
        &mut self,
        attrs: CharacterAttrs,
        now: DateTime<Utc>,
    ) -> Result<Character, CatalogueError> {
        let id = CharacterId(self.next_id);
        let next_id = self.next_id.saturating_add(1);

        let character = Character {
            id,
            attrs,
            created_at: now,
            updated_at: now,
        };
        let bytes = encode(&character)?;

        let write_txn = self.db.begin_write().map_err(io_error)?;
        {
            let mut records = write_txn.open_table(CHARACTERS).map_err(io_error)?;
            records.insert(id.0, bytes.as_slice()).map_err(io_error)?;

            let mut meta = write_txn.open_table(METADATA).map_err(io_error)?;
            meta.insert(NEXT_ID_KEY, next_id).map_err(io_error)?;
        }
        write_txn.commit().map_err(io_error)?;

        // Update in-memory state only after successful commit.
        self.next_id = next_id;
        Ok(character)
    }

    fn get(&self, id: CharacterId) -> Result<Option<Character>, CatalogueError> {
        let read_txn = self.db.begin_read().map_err(io_error)?;
        let records = read_txn.open_table(CHARACTERS).map_err(io_error)?;

        match records.get(id.0).map_err(io_error)? {
            Some(value) => decode(value.value()).map(Some),
            None => Ok(None),
        }
    }

    fn update(&mut self, character: &Character) -> Result<bool, CatalogueError> {
        let bytes = encode(character)?;

        let write_txn = self.db.begin_write().map_err(io_error)?;
        let existed = {
            let mut records = write_txn.open_table(CHARACTERS).map_err(io_error)?;
            let existed = records.get(character.id.0).map_err(io_error)?.is_some();
            if existed {
                records
                    .insert(character.id.0, bytes.as_slice())
                    .map_err(io_error)?;
            }
            existed
        };

        if existed {
            write_txn.commit().map_err(io_error)?;
        } else {
            write_txn.abort().map_err(io_error)?;
        }
        Ok(existed)
    }

    fn delete(&mut self, id: CharacterId) -> Result<bool, CatalogueError> {
        let write_txn = self.db.begin_write().map_err(io_error)?;
        let existed = {
            let mut records = write_txn.open_table(CHARACTERS).map_err(io_error)?;
            records.remove(id.0).map_err(io_error)?.is_some()
        };
        write_txn.commit().map_err(io_error)?;
        Ok(existed)
    }

    fn all(&self) -> Result<Vec<Character>, CatalogueError> {
        let read_txn = self.db.begin_read().map_err(io_error)?;
        let records = read_txn.open_table(CHARACTERS).map_err(io_error)?;

        let mut characters = Vec::new();
        for entry in records.iter().map_err(io_error)? {
            let (_, value) = entry.map_err(io_error)?;
            characters.push(decode(value.value())?);
        }
        Ok(characters)
    }

    fn count(&self) -> Result<usize, CatalogueError> {
        let read_txn = self.db.begin_read().map_err(io_error)?;
        let count = read_txn
            .open_table(CHARACTERS)
            .map_err(io_error)?
            .len()
            .map_err(io_error)?;
        Ok(count as usize)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::{Decimal2, Universe};
    use tempfile::tempdir;

    fn sample() -> CharacterAttrs {
        CharacterAttrs {
            real_name: Some("Peter Parker".to_string()),
            alias: Some("Spidey".to_string()),
            age: Some(25),
            height: Some(Decimal2(17550)),
            weight: Some(Decimal2(7000)),
            power_level: 7,
            ..CharacterAttrs::named("Spider-Man")
        }
    }

    #[test]
    fn basic_operations() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let created = store.insert(sample(), Utc::now()).expect("insert");
        assert_eq!(created.id, CharacterId(1));
        assert_eq!(store.count().expect("count"), 1);

        let fetched = store.get(created.id).expect("get").expect("exists");
        assert_eq!(fetched, created);
        assert_eq!(fetched.attrs.height, Some(Decimal2(17550)));
    }

    #[test]
    fn update_replaces_record() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let mut record = store.insert(sample(), Utc::now()).expect("insert");
        record.attrs.universe = Universe::Other;
        record.attrs.is_villain = true;
        assert!(store.update(&record).expect("update"));

        let fetched = store.get(record.id).expect("get").expect("exists");
        assert_eq!(fetched.attrs.universe, Universe::Other);
        assert!(fetched.attrs.is_villain);
    }

    #[test]
    fn update_and_delete_of_missing_record() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let record = store.insert(sample(), Utc::now()).expect("insert");
        assert!(store.delete(record.id).expect("delete"));
        assert!(!store.delete(record.id).expect("delete again"));
        assert!(!store.update(&record).expect("update"));
        assert!(store.get(record.id).expect("get").is_none());
    }

    #[test]
    fn persistence() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        let batman = {
            let mut store = RedbStore::open(&db_path).expect("open db");
            let spidey = store.insert(sample(), Utc::now()).expect("insert");
            store.delete(spidey.id).expect("delete");
            store
                .insert(CharacterAttrs::named("Batman"), Utc::now())
                .expect("insert")
        };

        let mut reopened = RedbStore::open(&db_path).expect("reopen db");
        let all = reopened.all().expect("all");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].attrs.name, "Batman");

        // The id counter survives the restart.
        let next = reopened
            .insert(CharacterAttrs::named("Joker"), Utc::now())
            .expect("insert");
        assert!(next.id > batman.id);
    }
}
