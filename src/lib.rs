//! MultiStore - Hierarchical typed entity store
//!
//! This crate re-exports all layers of the MultiStore system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: multistore_storage    - Validation, relationship index, store, snapshots
//! Layer 0: multistore_foundation - Core types (EntityId, EntityType, Entity, Error)
//! ```

pub use multistore_foundation as foundation;
pub use multistore_storage as storage;
