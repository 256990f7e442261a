//! Integration tests for hierarchy queries
//!
//! Tests children, siblings, ancestry, paths, trees and typed lookups.

use multistore_foundation::EntityType;
use multistore_storage::{MultiStore, StoreConfig};

use crate::common::*;

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn ancestors_nearest_first() {
    let store = kennel_store();
    assert_eq!(
        store.get_ancestors(&id("s1")),
        vec![id("v1"), id("breeds"), id("ws1")]
    );
}

#[test]
fn path_runs_root_to_node() {
    let store = kennel_store();
    assert_eq!(
        store.get_path(&id("f1")),
        vec![id("ws1"), id("breeds"), id("v1"), id("f1")]
    );
    assert_eq!(store.get_path(&id("ws1")), vec![id("ws1")]);
}

#[test]
fn depth_counts_ancestors() {
    let store = kennel_store();
    assert_eq!(store.get_depth(&id("ws1")), Some(0));
    assert_eq!(store.get_depth(&id("pets")), Some(1));
    assert_eq!(store.get_depth(&id("p1")), Some(2));
    assert_eq!(store.get_depth(&id("s1")), Some(3));
}

#[test]
fn descendants_breadth_first() {
    let store = kennel_store();
    assert_eq!(
        store.get_descendants(&id("breeds")),
        vec![id("b1"), id("b2"), id("v1"), id("f1"), id("s1")]
    );
}

#[test]
fn siblings_share_a_parent() {
    let store = kennel_store();
    assert_eq!(store.get_siblings(&id("f1")), vec![id("s1")]);
    assert_eq!(
        store.get_siblings(&id("p2")),
        vec![id("p1"), id("k1"), id("c1")]
    );
    assert!(store.get_siblings(&id("ws1")).is_empty());
}

#[test]
fn ancestry_is_directional() {
    let store = kennel_store();
    assert!(store.is_ancestor(&id("ws1"), &id("s1")));
    assert!(store.is_descendant(&id("s1"), &id("ws1")));
    assert!(!store.is_ancestor(&id("s1"), &id("ws1")));
    assert!(!store.is_ancestor(&id("pets"), &id("b1")));
}

#[test]
fn unknown_ids_have_empty_answers() {
    let store = kennel_store();
    let ghost = id("ghost");
    assert!(store.get_children(&ghost).is_empty());
    assert!(store.get_ancestors(&ghost).is_empty());
    assert!(store.get_descendants(&ghost).is_empty());
    assert!(store.get_path(&ghost).is_empty());
    assert_eq!(store.get_depth(&ghost), None);
    assert!(store.get_hierarchy(&ghost).is_none());
}

// =============================================================================
// Trees and Typed Lookups
// =============================================================================

#[test]
fn hierarchy_mirrors_children() {
    let store = kennel_store();
    let tree = store.get_hierarchy(&id("ws1")).unwrap();

    assert_eq!(tree.len(), store.len());
    assert_eq!(tree.children.len(), 2);
    let breeds = &tree.children[0];
    assert_eq!(breeds.entity.id, id("breeds"));
    assert_eq!(breeds.children.len(), 3);
    assert_eq!(breeds.children[2].ids(), vec![id("v1"), id("f1"), id("s1")]);
}

#[test]
fn subtree_hierarchy() {
    let store = kennel_store();
    let tree = store.get_hierarchy(&id("v1")).unwrap();
    assert_eq!(tree.ids(), vec![id("v1"), id("f1"), id("s1")]);
}

#[test]
fn entities_by_type_in_insertion_order() {
    let store = kennel_store();
    let pets: Vec<_> = store
        .get_entities_by_type(EntityType::Pet)
        .iter()
        .map(|e| e.id.clone())
        .collect();
    assert_eq!(pets, vec![id("p1"), id("p2")]);
    assert!(store.get_entities_by_type(EntityType::Workspace).len() == 1);
}

#[test]
fn entities_by_parent() {
    let store = kennel_store();
    let types: Vec<_> = store
        .get_entities_by_parent(&id("pets"))
        .iter()
        .map(|e| e.entity_type())
        .collect();
    assert_eq!(
        types,
        vec![
            EntityType::Pet,
            EntityType::Pet,
            EntityType::Kennel,
            EntityType::Contact
        ]
    );
}

#[test]
fn find_by_predicate() {
    let store = kennel_store();
    let referencing = store.find_entities(|e| !e.references().is_empty());
    assert_eq!(referencing.len(), 1);
    assert_eq!(referencing[0].id, id("p1"));

    let leaves = store.find_entities(|e| e.entity_type().is_leaf());
    assert_eq!(leaves.len(), 8);
}

#[test]
fn iteration_follows_registry_order() {
    let store = kennel_store();
    let order: Vec<_> = store.iter().map(|e| e.entity_type()).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[test]
fn stats_report_shape() {
    let store = kennel_store();
    let stats = store.stats();
    assert_eq!(stats.total, 12);
    assert_eq!(stats.roots, 1);
    assert_eq!(stats.max_depth, 3);
    assert_eq!(stats.per_type[&EntityType::Space], 2);
    assert_eq!(stats.per_type.values().sum::<usize>(), 12);
}

// =============================================================================
// Walk Bounds
// =============================================================================

#[test]
fn shallow_walk_bound_truncates_ancestors() {
    let mut store = MultiStore::with_config(StoreConfig::default().with_max_ancestor_depth(2));
    store
        .add_entities(vec![
            workspace("ws1"),
            space("sp1", "ws1", multistore_foundation::Collection::Breeds),
            view("v1", "sp1"),
            filter("f1", "v1"),
        ])
        .unwrap();

    assert_eq!(store.get_ancestors(&id("f1")), vec![id("v1"), id("sp1")]);
    assert_eq!(store.config().max_ancestor_depth, 2);
}

#[test]
fn strict_preset_handles_real_hierarchies() {
    let mut store = MultiStore::with_config(StoreConfig::strict());
    store.import_store(kennel_store().export_store()).unwrap();
    assert_eq!(store.get_depth(&id("s1")), Some(3));
}
