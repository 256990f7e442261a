//! Store snapshots.
//!
//! A [`Snapshot`] is the full state of a [`MultiStore`]: every entity with its
//! fields and metadata, plus the active slots. With the `serde` feature it
//! encodes to `MessagePack` with named fields.

use std::collections::BTreeMap;

use multistore_foundation::{Entity, EntityId, EntityType, Error, ErrorContext, Result};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::store::MultiStore;

/// Snapshot layout version written by [`MultiStore::export_store`].
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Versioned image of a store.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Snapshot {
    /// Layout version; see [`SNAPSHOT_FORMAT_VERSION`].
    pub format_version: u32,
    /// Every entity, in export order.
    pub entities: Vec<Entity>,
    /// Active id per type.
    #[cfg_attr(feature = "serde", serde(default))]
    pub active: BTreeMap<EntityType, EntityId>,
}

impl Snapshot {
    /// Creates a current-version snapshot from parts.
    #[must_use]
    pub fn new(entities: Vec<Entity>, active: BTreeMap<EntityType, EntityId>) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            entities,
            active,
        }
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the snapshot holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Encodes the snapshot as `MessagePack`.
    ///
    /// # Errors
    ///
    /// Returns a `Serialization` error if encoding fails.
    #[cfg(feature = "serde")]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self).map_err(|e| Error::serialization(e.to_string()))
    }

    /// Decodes a snapshot from `MessagePack`.
    ///
    /// The format version is not checked here; [`MultiStore::import_store`]
    /// does that.
    ///
    /// # Errors
    ///
    /// Returns a `Serialization` error if decoding fails.
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| Error::serialization(e.to_string()))
    }
}

impl MultiStore {
    /// Captures the store: entities grouped by type in registry order,
    /// insertion order within a type, plus the active slots.
    #[must_use]
    pub fn export_store(&self) -> Snapshot {
        let entities = self.iter().cloned().collect();
        let active = self.index().active_slots().into_iter().collect();
        Snapshot::new(entities, active)
    }

    /// Replaces the store's contents with a snapshot.
    ///
    /// Entities may appear in any order; parents are committed before their
    /// children. The snapshot is loaded into a fresh store first, so on error
    /// the current contents are left as they were. The retired id list is
    /// reset.
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` for another layout version, any error
    /// [`add_entities`](Self::add_entities) reports, or `NotFound` for an
    /// active slot naming an entity the snapshot does not hold.
    pub fn import_store(&mut self, snapshot: Snapshot) -> Result<()> {
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(Error::unsupported_format(
                snapshot.format_version,
                SNAPSHOT_FORMAT_VERSION,
            ));
        }

        let mut fresh = MultiStore::with_config(self.config().clone());
        let imported = fresh.add_entities(snapshot.entities)?.len();

        for (ty, id) in snapshot.active {
            let holds_type = fresh.get_entity(&id).map(Entity::entity_type) == Some(ty);
            if !holds_type {
                return Err(Error::not_found(id).with_context(
                    ErrorContext::new().with_operation(format!("import_store (active {ty})")),
                ));
            }
            fresh.set_active_entity(&id)?;
        }

        debug!(entities = imported, "store imported");
        *self = fresh;
        Ok(())
    }
}
