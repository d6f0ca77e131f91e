//! # Persistent Storage
//!
//! Disk-backed implementations of [`CharacterStore`](crate::store::CharacterStore).

mod redb_store;

pub use redb_store::RedbStore;
