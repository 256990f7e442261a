//! Shared builders for storage tests.

use multistore_foundation::{
    Breed, BreedSize, Collection, Contact, ContactRole, Entity, EntityId, Filter, FilterOperator,
    Kennel, Pet, PetStatus, Sort, SortDirection, Space, View, ViewLayout, Workspace,
};
use multistore_storage::MultiStore;

pub fn id(raw: &str) -> EntityId {
    EntityId::new(raw)
}

pub fn workspace(raw: &str) -> Entity {
    Entity::new(raw, Workspace::new("Kennel HQ"))
}

pub fn space(raw: &str, parent: &str, collection: Collection) -> Entity {
    Entity::new(raw, Space::new(raw, collection)).with_parent(parent)
}

pub fn view(raw: &str, parent: &str) -> Entity {
    Entity::new(raw, View::new("All", ViewLayout::Table)).with_parent(parent)
}

pub fn filter(raw: &str, parent: &str) -> Entity {
    Entity::new(
        raw,
        Filter::new("status", FilterOperator::Equals).with_value("available"),
    )
    .with_parent(parent)
}

pub fn sort(raw: &str, parent: &str) -> Entity {
    Entity::new(raw, Sort::new("name", SortDirection::Asc)).with_parent(parent)
}

pub fn breed(raw: &str, parent: &str) -> Entity {
    Entity::new(
        raw,
        Breed::new("Beagle", BreedSize::Medium).with_weight(9.0, 11.0),
    )
    .with_parent(parent)
}

pub fn pet(raw: &str, parent: &str, breed: Option<&str>) -> Entity {
    let mut record = Pet::new("Rex", PetStatus::Available);
    if let Some(breed) = breed {
        record = record.with_breed(breed);
    }
    Entity::new(raw, record).with_parent(parent)
}

pub fn kennel(raw: &str, parent: &str) -> Entity {
    Entity::new(raw, Kennel::new("Oak Hill").with_established_year(1985)).with_parent(parent)
}

pub fn contact(raw: &str, parent: &str) -> Entity {
    Entity::new(
        raw,
        Contact::new("Ann", ContactRole::Buyer).with_email("ann@example.com"),
    )
    .with_parent(parent)
}

/// ```text
/// ws1
/// ├── breeds: b1, b2, v1 (f1, s1)
/// └── pets:   p1 (breed b1), p2, k1, c1
/// ```
pub fn kennel_store() -> MultiStore {
    let mut store = MultiStore::new();
    store
        .add_entities(vec![
            workspace("ws1"),
            space("breeds", "ws1", Collection::Breeds),
            space("pets", "ws1", Collection::Pets),
            breed("b1", "breeds"),
            breed("b2", "breeds"),
            view("v1", "breeds"),
            filter("f1", "v1"),
            sort("s1", "v1"),
            pet("p1", "pets", Some("b1")),
            pet("p2", "pets", None),
            kennel("k1", "pets"),
            contact("c1", "pets"),
        ])
        .unwrap();
    store
}
