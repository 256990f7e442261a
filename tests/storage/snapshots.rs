//! Integration tests for snapshots
//!
//! Tests export order, import from any order, round trips and encoding.

use multistore_foundation::{EntityType, ErrorKind};
use multistore_storage::{MultiStore, SNAPSHOT_FORMAT_VERSION, Snapshot};

use crate::common::*;

#[test]
fn export_concatenates_types_in_registry_order() {
    let snapshot = kennel_store().export_store();
    let ids: Vec<_> = snapshot.entities.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "ws1", "breeds", "pets", "v1", "f1", "s1", "b1", "b2", "p1", "p2", "k1", "c1"
        ]
    );
}

#[test]
fn round_trip_is_observationally_identical() {
    let mut original = kennel_store();
    original.set_active_entity(&id("b2")).unwrap();
    original.set_active_entity(&id("v1")).unwrap();
    original.move_entity(&id("c1"), Some(id("breeds"))).unwrap();

    let mut restored = MultiStore::new();
    restored.import_store(original.export_store()).unwrap();

    for ty in EntityType::ALL {
        let a: Vec<_> = original.get_entities_by_type(ty);
        let b: Vec<_> = restored.get_entities_by_type(ty);
        assert_eq!(a, b, "entities of type {ty} differ");
        assert_eq!(original.active_id(ty), restored.active_id(ty));
    }
    for entity in original.iter() {
        let mut expected = original.get_children(&entity.id).to_vec();
        let mut actual = restored.get_children(&entity.id).to_vec();
        expected.sort();
        actual.sort();
        assert_eq!(expected, actual, "children of {} differ", entity.id);
        assert_eq!(original.get_path(&entity.id), restored.get_path(&entity.id));
    }
    assert!(restored.validate_store().is_valid);
}

#[test]
fn import_from_shuffled_snapshot() {
    let mut snapshot = kennel_store().export_store();
    // Interleave children ahead of their parents
    snapshot.entities.rotate_left(5);

    let mut store = MultiStore::new();
    store.import_store(snapshot).unwrap();
    assert_eq!(store.len(), 12);
    assert!(store.validate_store().is_valid);
}

#[test]
fn import_with_cycle_fails_cleanly() {
    let mut snapshot = kennel_store().export_store();
    for entity in &mut snapshot.entities {
        if entity.id.as_str() == "v1" {
            entity.parent_id = Some(id("f1"));
        }
    }

    let mut store = kennel_store();
    let err = store.import_store(snapshot).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CycleDetected { .. }));
    assert_eq!(store.len(), 12);
}

#[test]
fn future_format_is_refused() {
    let mut snapshot = kennel_store().export_store();
    snapshot.format_version = SNAPSHOT_FORMAT_VERSION + 1;
    let err = MultiStore::new().import_store(snapshot).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnsupportedFormat { .. }));
}

#[test]
fn message_pack_round_trip() {
    let mut store = kennel_store();
    store.set_active_entity(&id("p1")).unwrap();
    let snapshot = store.export_store();

    let bytes = snapshot.to_bytes().unwrap();
    let decoded = Snapshot::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, snapshot);

    let mut restored = MultiStore::new();
    restored.import_store(decoded).unwrap();
    assert_eq!(restored.active_id(EntityType::Pet), Some(&id("p1")));
}

#[test]
fn truncated_bytes_are_a_serialization_error() {
    let bytes = kennel_store().export_store().to_bytes().unwrap();
    let err = Snapshot::from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Serialization(_)));
}
