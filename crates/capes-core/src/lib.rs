//! # capes-core
//!
//! The character catalogue engine for Capes - THE LOGIC.
//!
//! This crate implements the catalogue itself: the record model and its
//! invariants, the filter/ordering/pagination engine, validation and view
//! shaping, aggregate statistics and the status actions.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Reaches storage only through the [`CharacterStore`] trait
//! - Validates every write before it touches the store
//! - Uses integer arithmetic only (decimals are fixed-point hundredths)
//! - Has NO async, NO network dependencies and NO logging (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod catalogue;
pub mod filter;
pub mod primitives;
pub mod stats;
pub mod storage;
pub mod store;
pub mod types;
pub mod view;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CatalogueError, Character, CharacterAttrs, CharacterId, Decimal2, DecimalParseError,
    FieldErrors, Universe, display_name, power_description,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use catalogue::{Catalogue, StorageBackend, ToggleOutcome, parse_limit};
pub use filter::{
    Bounds, CharacterFilter, ListParams, OrderField, OrderKey, Page, PageRequest, SortOrder,
};
pub use stats::StatsSnapshot;
pub use storage::RedbStore;
pub use store::{CharacterStore, MemoryStore};
pub use view::{CharacterInput, DetailView, FieldValue, ListView, WriteMode};
