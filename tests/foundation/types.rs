//! Integration tests for the entity type registry
//!
//! Tests the compatibility table, parent requirements and name parsing.

use multistore_foundation::{EntityType, ErrorKind};

// =============================================================================
// Compatibility Table
// =============================================================================

#[test]
fn workspace_contains_only_spaces() {
    assert_eq!(EntityType::Workspace.allowed_children(), &[EntityType::Space]);
    for ty in EntityType::ALL {
        assert_eq!(EntityType::Workspace.can_contain(ty), ty == EntityType::Space);
    }
}

#[test]
fn space_contains_views_and_data() {
    let allowed = EntityType::Space.allowed_children();
    assert_eq!(allowed.len(), 5);
    for ty in [
        EntityType::View,
        EntityType::Breed,
        EntityType::Pet,
        EntityType::Kennel,
        EntityType::Contact,
    ] {
        assert!(EntityType::Space.can_contain(ty), "space should contain {ty}");
    }
    assert!(!EntityType::Space.can_contain(EntityType::Space));
}

#[test]
fn view_contains_filters_and_sorts() {
    assert_eq!(
        EntityType::View.allowed_children(),
        &[EntityType::Filter, EntityType::Sort]
    );
}

#[test]
fn data_and_clause_types_are_leaves() {
    let leaves: Vec<_> = EntityType::ALL.into_iter().filter(|t| t.is_leaf()).collect();
    assert_eq!(
        leaves,
        vec![
            EntityType::Filter,
            EntityType::Sort,
            EntityType::Breed,
            EntityType::Pet,
            EntityType::Kennel,
            EntityType::Contact,
        ]
    );
}

#[test]
fn no_type_can_contain_itself() {
    for ty in EntityType::ALL {
        assert!(!ty.can_contain(ty), "{ty} must not contain itself");
    }
}

// =============================================================================
// Parent Requirement and Field Contracts
// =============================================================================

#[test]
fn only_workspace_is_parentless() {
    for ty in EntityType::ALL {
        assert_eq!(ty.requires_parent(), ty != EntityType::Workspace);
    }
}

#[test]
fn every_type_requires_a_label_field() {
    for ty in EntityType::ALL {
        let required = ty.required_fields();
        assert!(
            required.contains(&"name") || required.contains(&"field"),
            "{ty} has no label field"
        );
    }
}

// =============================================================================
// Names
// =============================================================================

#[test]
fn names_round_trip() {
    for ty in EntityType::ALL {
        assert_eq!(ty.as_str().parse::<EntityType>().unwrap(), ty);
        assert_eq!(ty.to_string(), ty.as_str());
    }
}

#[test]
fn unknown_name_lists_known_types() {
    let err = "litter".parse::<EntityType>().unwrap_err();
    match &err.kind {
        ErrorKind::InvalidEnumValue { value, allowed, .. } => {
            assert_eq!(value, "litter");
            assert_eq!(allowed.len(), EntityType::ALL.len());
        }
        other => panic!("unexpected error kind: {other:?}"),
    }
}
