//! # Catalogue Module
//!
//! The operation façade: every read, write and action goes through a
//! [`Catalogue`] wrapping some [`CharacterStore`].
//!
//! ## Storage Backends
//!
//! [`StorageBackend`] lets callers pick a store at runtime:
//! - `InMemory`: [`MemoryStore`] (fast, volatile)
//! - `Persistent`: [`RedbStore`] (disk-backed, ACID)
//!
//! ## Concurrency
//!
//! Toggles are a plain read-modify-write. Callers sharing one catalogue
//! between threads must serialise mutations themselves.

use crate::filter::{CharacterFilter, ListParams, OrderField, OrderKey, Page, SortOrder};
use crate::primitives::DEFAULT_TOP_LIMIT;
use crate::stats::StatsSnapshot;
use crate::storage::RedbStore;
use crate::store::{CharacterStore, MemoryStore};
use crate::view::{CharacterInput, DetailView, ListView, WriteMode};
use crate::{Character, CharacterAttrs, CharacterId, CatalogueError, Universe};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Runtime-selected store.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory records (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed records using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

impl CharacterStore for StorageBackend {
    fn insert(
        &mut self,
        attrs: CharacterAttrs,
        now: chrono::DateTime<Utc>,
    ) -> Result<Character, CatalogueError> {
        match self {
            Self::InMemory(s) => s.insert(attrs, now),
            Self::Persistent(s) => s.insert(attrs, now),
        }
    }

    fn get(&self, id: CharacterId) -> Result<Option<Character>, CatalogueError> {
        match self {
            Self::InMemory(s) => s.get(id),
            Self::Persistent(s) => s.get(id),
        }
    }

    fn update(&mut self, character: &Character) -> Result<bool, CatalogueError> {
        match self {
            Self::InMemory(s) => s.update(character),
            Self::Persistent(s) => s.update(character),
        }
    }

    fn delete(&mut self, id: CharacterId) -> Result<bool, CatalogueError> {
        match self {
            Self::InMemory(s) => s.delete(id),
            Self::Persistent(s) => s.delete(id),
        }
    }

    fn all(&self) -> Result<Vec<Character>, CatalogueError> {
        match self {
            Self::InMemory(s) => s.all(),
            Self::Persistent(s) => s.all(),
        }
    }

    fn count(&self) -> Result<usize, CatalogueError> {
        match self {
            Self::InMemory(s) => s.count(),
            Self::Persistent(s) => s.count(),
        }
    }
}

// =============================================================================
// ACTION RESULTS
// =============================================================================

/// Result of a status toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub message: String,
    pub character: DetailView,
}

/// Parse a raw `limit` parameter. Absent means the default of 10.
pub fn parse_limit(raw: Option<&str>) -> Result<usize, CatalogueError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_TOP_LIMIT),
        Some(value) => value.parse::<usize>().map_err(|_| {
            CatalogueError::invalid(
                "limit",
                "Invalid value for 'limit'. Must be a non-negative integer.",
            )
        }),
    }
}

// =============================================================================
// CATALOGUE
// =============================================================================

/// Operation façade over a character store.
#[derive(Debug, Default)]
pub struct Catalogue<S: CharacterStore> {
    store: S,
}

impl Catalogue<StorageBackend> {
    /// Catalogue with volatile in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(StorageBackend::default())
    }

    /// Catalogue backed by a redb file, created if missing.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        Ok(Self::new(StorageBackend::Persistent(RedbStore::open(path)?)))
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.store, StorageBackend::Persistent(_))
    }
}

impl<S: CharacterStore> Catalogue<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, CatalogueError> {
        self.store.count()
    }

    pub fn is_empty(&self) -> Result<bool, CatalogueError> {
        Ok(self.len()? == 0)
    }

    fn require(&self, id: CharacterId) -> Result<Character, CatalogueError> {
        self.store.get(id)?.ok_or(CatalogueError::NotFound(id))
    }

    /// Records matching `filter`, ordered.
    fn select(
        &self,
        filter: &CharacterFilter,
        order: &SortOrder,
    ) -> Result<Vec<Character>, CatalogueError> {
        let mut records: Vec<Character> = self
            .store
            .all()?
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect();
        order.sort(&mut records);
        Ok(records)
    }

    fn list_views(records: &[Character]) -> Vec<ListView> {
        records.iter().map(ListView::from).collect()
    }

    // -------------------------------------------------------------------------
    // CRUD
    // -------------------------------------------------------------------------

    /// Filtered, ordered, paginated listing.
    pub fn list(&self, params: &ListParams) -> Result<Page<ListView>, CatalogueError> {
        let records = self.select(&params.filter, &params.ordering)?;
        Ok(params.page.paginate(Self::list_views(&records)))
    }

    pub fn get(&self, id: CharacterId) -> Result<DetailView, CatalogueError> {
        self.require(id).map(|c| DetailView::from(&c))
    }

    /// Validate and store a new record.
    pub fn create(&mut self, input: CharacterInput) -> Result<DetailView, CatalogueError> {
        let existing = self.store.all()?;
        let attrs = input.apply(CharacterAttrs::named(""), WriteMode::Create, &existing, None)?;
        let created = self.store.insert(attrs, Utc::now())?;
        Ok(DetailView::from(&created))
    }

    /// Full (`partial == false`, name required) or partial update.
    pub fn update(
        &mut self,
        id: CharacterId,
        input: CharacterInput,
        partial: bool,
    ) -> Result<DetailView, CatalogueError> {
        let current = self.require(id)?;
        let existing = self.store.all()?;
        let mode = if partial {
            WriteMode::Patch
        } else {
            WriteMode::Replace
        };
        let attrs = input.apply(current.attrs.clone(), mode, &existing, Some(id))?;
        self.persist(current, attrs).map(|c| DetailView::from(&c))
    }

    pub fn delete(&mut self, id: CharacterId) -> Result<(), CatalogueError> {
        if self.store.delete(id)? {
            Ok(())
        } else {
            Err(CatalogueError::NotFound(id))
        }
    }

    /// Write new attributes over `current`, refreshing `updated_at`.
    fn persist(
        &mut self,
        current: Character,
        attrs: CharacterAttrs,
    ) -> Result<Character, CatalogueError> {
        let id = current.id;
        let updated = Character {
            attrs,
            // Never step backwards if the clock does.
            updated_at: Utc::now().max(current.updated_at),
            ..current
        };
        if self.store.update(&updated)? {
            Ok(updated)
        } else {
            Err(CatalogueError::NotFound(id))
        }
    }

    // -------------------------------------------------------------------------
    // AGGREGATES & QUERIES
    // -------------------------------------------------------------------------

    pub fn stats(&self) -> Result<StatsSnapshot, CatalogueError> {
        Ok(StatsSnapshot::compute(&self.store.all()?))
    }

    /// Records of one universe (case-insensitive), default order.
    /// An unknown universe yields an empty list.
    pub fn by_universe(&self, universe: Option<&str>) -> Result<Vec<ListView>, CatalogueError> {
        let raw = universe.map(str::trim).filter(|u| !u.is_empty()).ok_or_else(|| {
            CatalogueError::invalid("universe", "Universe parameter is required")
        })?;

        let Some(universe) = Universe::parse_ci(raw) else {
            return Ok(Vec::new());
        };
        let filter = CharacterFilter {
            universe: Some(universe),
            ..CharacterFilter::new()
        };
        Ok(Self::list_views(&self.select(&filter, &SortOrder::default())?))
    }

    /// Strongest non-villains: power level descending, then name.
    pub fn top(&self, limit: usize) -> Result<Vec<ListView>, CatalogueError> {
        let filter = CharacterFilter {
            is_villain: Some(false),
            ..CharacterFilter::new()
        };
        let order = SortOrder::new(vec![OrderKey::desc(OrderField::PowerLevel)]);
        let mut records = self.select(&filter, &order)?;
        records.truncate(limit);
        Ok(Self::list_views(&records))
    }

    pub fn villains(&self) -> Result<Vec<ListView>, CatalogueError> {
        let filter = CharacterFilter {
            is_villain: Some(true),
            ..CharacterFilter::new()
        };
        Ok(Self::list_views(&self.select(&filter, &SortOrder::default())?))
    }

    // -------------------------------------------------------------------------
    // TOGGLES
    // -------------------------------------------------------------------------

    pub fn toggle_villain(&mut self, id: CharacterId) -> Result<ToggleOutcome, CatalogueError> {
        let current = self.require(id)?;
        let mut attrs = current.attrs.clone();
        attrs.is_villain = !attrs.is_villain;

        let updated = self.persist(current, attrs)?;
        let status = if updated.attrs.is_villain {
            "a villain"
        } else {
            "a superhero"
        };
        Ok(ToggleOutcome {
            message: format!("{} is now {}", updated.attrs.name, status),
            character: DetailView::from(&updated),
        })
    }

    pub fn toggle_active(&mut self, id: CharacterId) -> Result<ToggleOutcome, CatalogueError> {
        let current = self.require(id)?;
        let mut attrs = current.attrs.clone();
        attrs.is_active = !attrs.is_active;

        let updated = self.persist(current, attrs)?;
        let status = if updated.attrs.is_active {
            "active"
        } else {
            "inactive"
        };
        Ok(ToggleOutcome {
            message: format!("{} is now {}", updated.attrs.name, status),
            character: DetailView::from(&updated),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
