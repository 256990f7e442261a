//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: EntityId, EntityType, entity records and Error.

mod records;
mod types;
