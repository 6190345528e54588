//! Keyed authoritative table with merge-update semantics.
//!
//! # Operations
//!
//! | Operation | Unknown id | Known id |
//! |-----------|------------|----------|
//! | [`EntityStore::insert_if_absent`] | insert | keep existing |
//! | [`EntityStore::merge_update`] | no-op | field-level merge |
//! | [`EntityStore::upsert`] | insert | merge all patchable fields |
//! | [`EntityStore::replace_all`] | insert | overwrite, and drop everything else |
//!
//! Every operation is synchronous and total. The lock is never held across
//! an `.await`, so concurrent callers observe each operation atomically.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::identifiers::DriverId;
use crate::model::{Driver, DriverPatch, Ride, RideStatus};

use super::entity::Entity;

// ============================================================================
// EntityStore
// ============================================================================

/// Owning table for one entity kind.
///
/// Callers only ever receive clones; there is no way to obtain a mutable
/// handle into the table.
pub struct EntityStore<T: Entity> {
    /// Label used in logs.
    kind: &'static str,
    /// Entities by identity.
    table: RwLock<FxHashMap<T::Id, T>>,
    /// Bumped on every effective mutation.
    version: AtomicU64,
}

/// Store of rides.
pub type RideStore = EntityStore<Ride>;

/// Store of drivers.
pub type DriverStore = EntityStore<Driver>;

impl<T: Entity> EntityStore<T> {
    /// Creates an empty store. `kind` labels log lines.
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            table: RwLock::new(FxHashMap::default()),
            version: AtomicU64::new(0),
        }
    }

    /// Replaces the whole table with `entities`.
    ///
    /// Entities absent from `entities` are removed; present ones override
    /// local state unconditionally. Duplicate ids keep the last occurrence.
    pub fn replace_all(&self, entities: impl IntoIterator<Item = T>) {
        let next: FxHashMap<T::Id, T> = entities
            .into_iter()
            .map(|entity| (entity.id().clone(), entity))
            .collect();
        let count = next.len();

        *self.table.write() = next;
        self.bump();

        debug!(kind = self.kind, count, "Store replaced from snapshot");
    }

    /// Inserts `entity` unless its identity is already present.
    ///
    /// Returns `true` if the entity was inserted.
    pub fn insert_if_absent(&self, entity: T) -> bool {
        let inserted = {
            let mut table = self.table.write();
            if table.contains_key(entity.id()) {
                false
            } else {
                table.insert(entity.id().clone(), entity);
                true
            }
        };

        if inserted {
            self.bump();
        }
        inserted
    }

    /// Merges `patch` into the entity with identity `id`.
    ///
    /// A no-op returning `false` when `id` is unknown; never creates an
    /// entity.
    pub fn merge_update(&self, id: &T::Id, patch: &T::Patch) -> bool {
        let changed = {
            let mut table = self.table.write();
            match table.get_mut(id) {
                Some(entity) => entity.merge(patch),
                None => {
                    trace!(kind = self.kind, %id, "Merge for unknown id ignored");
                    return false;
                }
            }
        };

        if changed {
            self.bump();
        }
        true
    }

    /// Inserts `entity`, or merges its patchable fields into the existing one.
    ///
    /// Used for command responses. Optional fields the response leaves
    /// empty never erase values already known locally.
    pub fn upsert(&self, entity: T) {
        let changed = {
            let mut table = self.table.write();
            match table.get_mut(entity.id()) {
                Some(existing) => existing.merge(&entity.to_patch()),
                None => {
                    table.insert(entity.id().clone(), entity);
                    true
                }
            }
        };

        if changed {
            self.bump();
        }
    }

    /// Returns a clone of the entity with identity `id`.
    #[must_use]
    pub fn get(&self, id: &T::Id) -> Option<T> {
        self.table.read().get(id).cloned()
    }

    /// Returns `true` if `id` is present.
    #[must_use]
    pub fn contains(&self, id: &T::Id) -> bool {
        self.table.read().contains_key(id)
    }

    /// Returns clones of all entities, in no particular order.
    #[must_use]
    pub fn list_all(&self) -> Vec<T> {
        self.table.read().values().cloned().collect()
    }

    /// Returns clones of the entities matching `predicate`.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.table
            .read()
            .values()
            .filter(|entity| predicate(entity))
            .cloned()
            .collect()
    }

    /// Returns the number of entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// Returns `true` if the store is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Returns the change counter.
    ///
    /// Consumers poll this to decide whether to re-read.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    #[inline]
    fn bump(&self) {
        self.version.fetch_add(1, Ordering::AcqRel);
    }
}

impl<T: Entity> std::fmt::Debug for EntityStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("kind", &self.kind)
            .field("len", &self.len())
            .field("version", &self.version())
            .finish()
    }
}

// ============================================================================
// Kind-specific Queries
// ============================================================================

impl EntityStore<Ride> {
    /// Returns all rides currently in `status`.
    #[must_use]
    pub fn by_status(&self, status: &RideStatus) -> Vec<Ride> {
        self.filter(|ride| ride.status == *status)
    }
}

impl EntityStore<Driver> {
    /// Moves a known driver. Touches only the coordinates.
    pub fn update_location(&self, id: &DriverId, lat: f64, lng: f64) -> bool {
        self.merge_update(id, &DriverPatch::location(lat, lng))
    }
}

// ============================================================================
// Tests
// ============================================================================
