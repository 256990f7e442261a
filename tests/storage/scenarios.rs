//! End-to-end scenarios for the kennel hierarchy
//!
//! Each test walks through one documented store interaction.

use multistore_foundation::{Collection, EntityType, ErrorKind, Space};
use multistore_storage::MultiStore;

use crate::common::*;

#[test]
fn workspace_then_space() {
    let mut store = MultiStore::new();
    store.add_entity(workspace("ws1")).unwrap();
    store
        .add_entity(space("sp1", "ws1", Collection::Breeds))
        .unwrap();

    assert_eq!(store.get_children(&id("ws1")), &[id("sp1")]);
}

#[test]
fn space_under_unknown_parent() {
    let mut store = MultiStore::new();
    store.add_entity(workspace("ws1")).unwrap();

    let err = store
        .add_entity(space("sp2", "ghost", Collection::Breeds))
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::UnknownParent { .. }));
    assert!(store.get_entity(&id("sp2")).is_none());
}

#[test]
fn breed_directly_under_workspace() {
    let mut store = MultiStore::new();
    store.add_entity(workspace("ws1")).unwrap();

    let err = store.add_entity(breed("b1", "ws1")).unwrap_err();

    match &err.kind {
        ErrorKind::IncompatibleParentChild {
            parent,
            child,
            allowed,
        } => {
            assert_eq!(*parent, EntityType::Workspace);
            assert_eq!(*child, EntityType::Breed);
            assert_eq!(allowed, &vec![EntityType::Space]);
        }
        other => panic!("unexpected error kind: {other:?}"),
    }
}

#[test]
fn cascade_from_the_root() {
    let mut store = MultiStore::new();
    store
        .add_entities(vec![
            workspace("ws1"),
            space("sp1", "ws1", Collection::Pets),
            breed("b1", "sp1"),
            pet("p1", "sp1", Some("b1")),
        ])
        .unwrap();

    store.remove_entity(&id("ws1"), true).unwrap();

    for gone in ["ws1", "sp1", "b1", "p1"] {
        assert!(store.get_entity(&id(gone)).is_none(), "{gone} survived");
    }
    assert!(store.is_empty());
    assert!(store.index().is_empty());
}

#[test]
fn batch_in_reverse_dependency_order() {
    let mut store = MultiStore::new();
    let committed = store
        .add_entities(vec![
            breed("b1", "sp1"),
            space("sp1", "ws1", Collection::Breeds),
            workspace("ws1"),
        ])
        .unwrap();

    assert_eq!(committed.len(), 3);
    assert_eq!(store.len(), 3);
    assert_eq!(
        store.get_path(&id("b1")),
        vec![id("ws1"), id("sp1"), id("b1")]
    );
}

#[test]
fn changing_the_type_is_refused() {
    let mut store = MultiStore::new();
    store.add_entity(workspace("ws1")).unwrap();

    let err = store
        .update_entity(&id("ws1"), |e| {
            e.data = Space::new("ws1", Collection::Breeds).into();
        })
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::ImmutableFieldViolation { .. }));
    assert_eq!(store.get_entity(&id("ws1")).unwrap().metadata.version, 1);
}
