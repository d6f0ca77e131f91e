//! # Record Store
//!
//! The persistence boundary of the catalogue.
//!
//! The engine only needs whole-record semantics from a store: insert,
//! fetch by id, replace by id, delete by id and a full scan. Filtering,
//! ordering and aggregation happen in memory above this trait, so any
//! backend that can provide these six operations is sufficient.
//!
//! Two backends ship with the crate:
//! - [`MemoryStore`]: a `BTreeMap`, volatile
//! - [`RedbStore`](crate::storage::RedbStore): a redb file, ACID and persistent

use crate::{Character, CharacterAttrs, CharacterId, CatalogueError};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Storage operations required by the catalogue.
///
/// Implementations must assign ids in strictly increasing order and never
/// reuse an id, even after the record holding it is deleted.
pub trait CharacterStore {
    /// Persist a new record. The store assigns the id and stamps both
    /// `created_at` and `updated_at` with `now`.
    fn insert(
        &mut self,
        attrs: CharacterAttrs,
        now: DateTime<Utc>,
    ) -> Result<Character, CatalogueError>;

    /// Fetch a record by id.
    fn get(&self, id: CharacterId) -> Result<Option<Character>, CatalogueError>;

    /// Replace the stored record with the same id.
    /// Returns `false` (and writes nothing) if no such record exists.
    fn update(&mut self, character: &Character) -> Result<bool, CatalogueError>;

    /// Remove a record permanently. Returns `false` if it did not exist.
    fn delete(&mut self, id: CharacterId) -> Result<bool, CatalogueError>;

    /// Every record, in ascending id order.
    fn all(&self) -> Result<Vec<Character>, CatalogueError>;

    /// Number of stored records.
    fn count(&self) -> Result<usize, CatalogueError>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Volatile store backed by a `BTreeMap`.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: BTreeMap<CharacterId, Character>,
    next_id: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CharacterStore for MemoryStore {
    fn insert(
        &mut self,
        attrs: CharacterAttrs,
        now: DateTime<Utc>,
    ) -> Result<Character, CatalogueError> {
        let id = CharacterId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let character = Character {
            id,
            attrs,
            created_at: now,
            updated_at: now,
        };
        self.records.insert(id, character.clone());
        Ok(character)
    }

    fn get(&self, id: CharacterId) -> Result<Option<Character>, CatalogueError> {
        Ok(self.records.get(&id).cloned())
    }

    fn update(&mut self, character: &Character) -> Result<bool, CatalogueError> {
        match self.records.get_mut(&character.id) {
            Some(slot) => {
                *slot = character.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&mut self, id: CharacterId) -> Result<bool, CatalogueError> {
        Ok(self.records.remove(&id).is_some())
    }

    fn all(&self) -> Result<Vec<Character>, CatalogueError> {
        Ok(self.records.values().cloned().collect())
    }

    fn count(&self) -> Result<usize, CatalogueError> {
        Ok(self.records.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut store = MemoryStore::new();
        let now = Utc::now();

        let a = store.insert(CharacterAttrs::named("A"), now).expect("insert");
        let b = store.insert(CharacterAttrs::named("B"), now).expect("insert");

        assert_eq!(a.id, CharacterId(1));
        assert_eq!(b.id, CharacterId(2));
        assert_eq!(a.created_at, now);
        assert_eq!(a.updated_at, now);
        assert_eq!(store.count().expect("count"), 2);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = MemoryStore::new();
        let now = Utc::now();

        let a = store.insert(CharacterAttrs::named("A"), now).expect("insert");
        assert!(store.delete(a.id).expect("delete"));
        let b = store.insert(CharacterAttrs::named("B"), now).expect("insert");

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn update_missing_record_is_a_no_op() {
        let mut store = MemoryStore::new();
        let mut ghost = store
            .insert(CharacterAttrs::named("Ghost"), Utc::now())
            .expect("insert");
        store.delete(ghost.id).expect("delete");

        ghost.attrs.power_level = 9;
        assert!(!store.update(&ghost).expect("update"));
        assert_eq!(store.count().expect("count"), 0);
    }

    #[test]
    fn delete_missing_record_returns_false() {
        let mut store = MemoryStore::new();
        assert!(!store.delete(CharacterId(42)).expect("delete"));
    }

    #[test]
    fn all_is_in_id_order() {
        let mut store = MemoryStore::new();
        let now = Utc::now();
        for name in ["Zed", "Amy", "Mo"] {
            store.insert(CharacterAttrs::named(name), now).expect("insert");
        }

        let ids: Vec<_> = store.all().expect("all").iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
