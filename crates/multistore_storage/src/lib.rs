//! Validation, hierarchy indexing, entity storage and snapshots for MultiStore.
//!
//! This crate provides:
//! - [`validate`] - Field, parent-child and cycle checks
//! - [`RelationshipIndex`] - Parent/child, type and active-slot indices
//! - [`MultiStore`] - The store: validated CRUD and hierarchy queries
//! - [`Snapshot`] - Versioned export and import of a whole store
//! - [`StoreConfig`] - Walk bounds, id reuse and auditing options

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod relationship;
pub mod snapshot;
pub mod store;
pub mod validate;

pub use config::{DEFAULT_MAX_ANCESTOR_DEPTH, StoreConfig};
pub use relationship::RelationshipIndex;
pub use snapshot::{SNAPSHOT_FORMAT_VERSION, Snapshot};
pub use store::{HierarchyNode, MultiStore, StoreStats, StoreViolation, ValidationReport};
pub use validate::{
    BatchValidation, EntityLookup, InvalidEntity, validate_entities, validate_entity,
    validate_parent_change, validate_parent_child,
};
