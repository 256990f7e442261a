//! Integration tests for entity records
//!
//! Tests ids, field enumerations, builders and metadata bookkeeping.

use chrono::{TimeZone, Utc};
use multistore_foundation::{
    Breed, BreedSize, Collection, Contact, ContactRole, Entity, EntityData, EntityId, EntityType,
    Filter, FilterOperator, Kennel, Metadata, Pet, PetStatus, Sex, SortDirection, Space,
    ValueRange, View, ViewLayout, Workspace,
};

// =============================================================================
// Identifiers
// =============================================================================

#[test]
fn ids_compare_by_text() {
    let a = EntityId::new("ws1");
    let b: EntityId = "ws1".into();
    let c: EntityId = String::from("ws2").into();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a < c);
    assert_eq!(a.to_string(), "ws1");
    assert_eq!(format!("{a:?}"), "EntityId(ws1)");
}

#[test]
fn blank_ids_are_detected() {
    assert!(EntityId::new("").is_blank());
    assert!(EntityId::new(" \t").is_blank());
    assert!(!EntityId::new("x").is_blank());
}

#[test]
fn ids_look_up_by_str() {
    let mut names = std::collections::HashMap::new();
    names.insert(EntityId::new("b1"), "Beagle");
    assert_eq!(names.get("b1"), Some(&"Beagle"));
}

// =============================================================================
// Field Enumerations
// =============================================================================

#[test]
fn collections_map_to_space_children() {
    for collection in Collection::ALL {
        assert!(EntityType::Space.can_contain(collection.member_type()));
    }
}

#[test]
fn enumerations_parse_their_own_names() {
    for layout in ViewLayout::ALL {
        assert_eq!(layout.as_str().parse::<ViewLayout>().unwrap(), *layout);
    }
    for op in FilterOperator::ALL {
        assert_eq!(op.to_string().parse::<FilterOperator>().unwrap(), *op);
    }
    for role in ContactRole::ALL {
        assert_eq!(role.as_str().parse::<ContactRole>().unwrap(), *role);
    }
    assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Desc);
    assert_eq!("female".parse::<Sex>().unwrap(), Sex::Female);
}

#[test]
fn enumeration_parsing_is_case_sensitive() {
    assert!("Table".parse::<ViewLayout>().is_err());
    assert!("ASC".parse::<SortDirection>().is_err());
}

#[test]
fn value_ranges() {
    let range = ValueRange::new(10.0, 14.0);
    assert!(range.contains(12.0));
    assert!(!range.contains(9.9));
}

// =============================================================================
// Builders
// =============================================================================

#[test]
fn builders_fill_optional_fields() {
    let breed = Breed::new("Border Collie", BreedSize::Medium)
        .with_origin("Scotland")
        .with_weight(14.0, 20.0)
        .with_height(46.0, 56.0)
        .with_life_expectancy(12.0, 15.0)
        .with_rating(4.8);
    assert_eq!(breed.origin.as_deref(), Some("Scotland"));
    assert_eq!(breed.weight, Some(ValueRange::new(14.0, 20.0)));
    assert_eq!(breed.rating, Some(4.8));

    let pet = Pet::new("Skye", PetStatus::Reserved)
        .with_breed("b1")
        .with_sex(Sex::Female)
        .with_weight(17.2)
        .with_microchip("985112004567890");
    assert_eq!(pet.breed_id, Some(EntityId::new("b1")));
    assert_eq!(pet.sex, Some(Sex::Female));

    let kennel = Kennel::new("Highland")
        .with_registration("KC-1234")
        .with_established_year(1998)
        .with_rating(4.0);
    assert_eq!(kennel.established_year, Some(1998));

    let contact = Contact::new("Dr. Vale", ContactRole::Veterinarian)
        .with_email("vale@clinic.example")
        .with_phone("+44 20 7946 0000");
    assert!(contact.email.is_some() && contact.phone.is_some());

    let ws = Workspace::new("Kennel")
        .with_description("Main workspace")
        .with_icon("paw");
    assert_eq!(ws.icon.as_deref(), Some("paw"));

    let space = Space::new("Dogs", Collection::Pets).with_icon("dog");
    assert_eq!(space.icon.as_deref(), Some("dog"));

    let view = View::new("Board", ViewLayout::Kanban).as_default();
    assert!(view.is_default);

    let filter = Filter::new("status", FilterOperator::Equals).with_value("available");
    assert_eq!(filter.value.as_deref(), Some("available"));
}

#[test]
fn entity_data_converts_from_records() {
    let data: EntityData = Contact::new("Ann", ContactRole::Owner).into();
    assert_eq!(data.entity_type(), EntityType::Contact);

    let entity = Entity::new("c1", data.clone()).with_parent("sp1");
    assert_eq!(entity.data, data);
    assert_eq!(entity.label(), "Ann");
}

// =============================================================================
// Metadata
// =============================================================================

#[test]
fn metadata_versions_grow_by_one() {
    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let t1 = Utc.timestamp_opt(1_700_000_600, 0).unwrap();

    let mut meta = Metadata::at(t0);
    for expected in 2..=5 {
        assert_eq!(meta.touch(t1), Some(expected));
        assert_eq!(meta.version, expected);
    }
    assert_eq!(meta.created_at, t0);
    assert_eq!(meta.updated_at, t1);
}

#[test]
fn fresh_entities_carry_fresh_metadata() {
    let before = Utc::now();
    let entity = Entity::new("ws1", Workspace::new("Main"));
    assert_eq!(entity.metadata.version, 1);
    assert!(entity.metadata.created_at >= before);
    assert!(entity.metadata.tags.is_empty());
}
