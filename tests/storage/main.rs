//! Integration tests for Layer 1: Storage
//!
//! Tests for the store, hierarchy queries, snapshots and store-wide properties.

mod common;
mod hierarchy;
mod scenarios;
mod snapshots;
