//! Validation engine.
//!
//! Pure checks over entity records and proposed hierarchy edges. Nothing in
//! this module mutates state: the store runs these checks before it touches
//! the relationship index or the entity table.

use std::collections::{HashMap, HashSet};
use std::hash::BuildHasher;

use multistore_foundation::{
    Breed, Contact, Entity, EntityData, EntityId, EntityType, Error, Filter, Kennel, Metadata,
    Pet, Result, ValueRange,
};

use crate::relationship::RelationshipIndex;

/// Highest rating a breed or kennel may carry.
pub const MAX_RATING: f64 = 5.0;

/// Earliest accepted kennel founding year.
pub const MIN_ESTABLISHED_YEAR: u16 = 1800;

// =============================================================================
// Lookup
// =============================================================================

/// Read access to registered entities, as needed by hierarchy checks.
pub trait EntityLookup {
    /// Returns the type of a registered id.
    fn type_of(&self, id: &EntityId) -> Option<EntityType>;

    /// Returns the parent of a registered id.
    fn parent_of(&self, id: &EntityId) -> Option<&EntityId>;
}

impl EntityLookup for RelationshipIndex {
    fn type_of(&self, id: &EntityId) -> Option<EntityType> {
        self.entity_type(id)
    }

    fn parent_of(&self, id: &EntityId) -> Option<&EntityId> {
        self.parent(id)
    }
}

impl<S: BuildHasher> EntityLookup for HashMap<EntityId, Entity, S> {
    fn type_of(&self, id: &EntityId) -> Option<EntityType> {
        self.get(id).map(Entity::entity_type)
    }

    fn parent_of(&self, id: &EntityId) -> Option<&EntityId> {
        self.get(id).and_then(|e| e.parent_id.as_ref())
    }
}

// =============================================================================
// Single Entity
// =============================================================================

/// Validates an entity's base contract and type-specific fields.
///
/// # Errors
///
/// Returns the first violation found: a blank id, a missing or forbidden
/// parent, malformed metadata, or a field that breaks its type's contract.
pub fn validate_entity(entity: &Entity) -> Result<()> {
    let ty = entity.entity_type();

    if entity.id.is_blank() {
        return Err(Error::missing_field(ty, "id"));
    }

    match (&entity.parent_id, ty.requires_parent()) {
        (None, true) => {
            return Err(Error::missing_parent(ty, format!("{ty} requires a parent")));
        }
        (Some(_), false) => {
            return Err(Error::missing_parent(ty, format!("{ty} cannot have a parent")));
        }
        (Some(parent), true) if parent.is_blank() => {
            return Err(Error::missing_parent(ty, "parent id is blank"));
        }
        _ => {}
    }

    validate_metadata(ty, &entity.metadata)?;
    validate_fields(&entity.data)
}

fn validate_metadata(ty: EntityType, metadata: &Metadata) -> Result<()> {
    if metadata.version < 1 {
        return Err(Error::invalid_range(
            ty,
            "version",
            metadata.version,
            "must be at least 1",
        ));
    }
    if metadata.updated_at < metadata.created_at {
        return Err(Error::invalid_range(
            ty,
            "updatedAt",
            metadata.updated_at.to_rfc3339(),
            "precedes createdAt",
        ));
    }
    if let Some(deleted_at) = metadata.deleted_at {
        if !metadata.is_deleted {
            return Err(Error::invalid_range(
                ty,
                "deletedAt",
                deleted_at.to_rfc3339(),
                "set on an entity that is not deleted",
            ));
        }
    }
    if let Some(index) = metadata.tags.iter().position(|t| t.trim().is_empty()) {
        return Err(Error::missing_field(ty, format!("tags[{index}]")));
    }
    Ok(())
}

/// Dispatches to the field checks of the entity's variant.
fn validate_fields(data: &EntityData) -> Result<()> {
    let ty = data.entity_type();
    match data {
        EntityData::Workspace(w) => require_text(ty, "name", &w.name),
        EntityData::Space(s) => require_text(ty, "name", &s.name),
        EntityData::View(v) => require_text(ty, "name", &v.name),
        EntityData::Filter(f) => validate_filter(f),
        EntityData::Sort(s) => require_text(ty, "field", &s.field),
        EntityData::Breed(b) => validate_breed(b),
        EntityData::Pet(p) => validate_pet(p),
        EntityData::Kennel(k) => validate_kennel(k),
        EntityData::Contact(c) => validate_contact(c),
    }
}

fn validate_filter(filter: &Filter) -> Result<()> {
    let ty = EntityType::Filter;
    require_text(ty, "field", &filter.field)?;
    let has_value = filter.value.as_deref().is_some_and(|v| !v.trim().is_empty());
    if filter.operator.takes_value() && !has_value {
        return Err(Error::missing_field(ty, "value"));
    }
    Ok(())
}

fn validate_breed(breed: &Breed) -> Result<()> {
    let ty = EntityType::Breed;
    require_text(ty, "name", &breed.name)?;
    check_range(ty, "weight", breed.weight)?;
    check_range(ty, "height", breed.height)?;
    check_range(ty, "lifeExpectancy", breed.life_expectancy)?;
    check_rating(ty, breed.rating)
}

fn validate_pet(pet: &Pet) -> Result<()> {
    let ty = EntityType::Pet;
    require_text(ty, "name", &pet.name)?;
    if pet.breed_id.as_ref().is_some_and(EntityId::is_blank) {
        return Err(Error::missing_field(ty, "breedId"));
    }
    if let Some(weight) = pet.weight_kg {
        check_finite(ty, "weightKg", weight)?;
        if weight <= 0.0 {
            return Err(Error::invalid_range(ty, "weightKg", weight, "must be positive"));
        }
    }
    Ok(())
}

fn validate_kennel(kennel: &Kennel) -> Result<()> {
    let ty = EntityType::Kennel;
    require_text(ty, "name", &kennel.name)?;
    if let Some(year) = kennel.established_year {
        if year < MIN_ESTABLISHED_YEAR {
            return Err(Error::invalid_range(
                ty,
                "establishedYear",
                year,
                format!("must be {MIN_ESTABLISHED_YEAR} or later"),
            ));
        }
    }
    check_rating(ty, kennel.rating)
}

fn validate_contact(contact: &Contact) -> Result<()> {
    let ty = EntityType::Contact;
    require_text(ty, "name", &contact.name)?;
    if let Some(email) = &contact.email {
        if !email.contains('@') {
            return Err(Error::invalid_range(ty, "email", email, "must contain '@'"));
        }
    }
    Ok(())
}

fn require_text(ty: EntityType, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::missing_field(ty, field));
    }
    Ok(())
}

fn check_finite(ty: EntityType, field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::invalid_range(ty, field, value, "must be a finite number"));
    }
    Ok(())
}

fn check_range(ty: EntityType, field: &str, range: Option<ValueRange>) -> Result<()> {
    let Some(range) = range else {
        return Ok(());
    };
    check_finite(ty, field, range.min)?;
    check_finite(ty, field, range.max)?;
    if range.min < 0.0 {
        return Err(Error::invalid_range(ty, field, range.min, "min must not be negative"));
    }
    if range.max < range.min {
        return Err(Error::invalid_range(
            ty,
            field,
            format!("{}..{}", range.min, range.max),
            "max must be at least min",
        ));
    }
    Ok(())
}

fn check_rating(ty: EntityType, rating: Option<f64>) -> Result<()> {
    let Some(rating) = rating else {
        return Ok(());
    };
    check_finite(ty, "rating", rating)?;
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(Error::invalid_range(
            ty,
            "rating",
            rating,
            format!("must be between 0 and {MAX_RATING}"),
        ));
    }
    Ok(())
}

// =============================================================================
// Hierarchy
// =============================================================================

/// Checks the compatibility table for a proposed edge.
///
/// # Errors
///
/// Returns `IncompatibleParentChild`, listing what the parent does accept.
pub fn validate_parent_child(parent: EntityType, child: EntityType) -> Result<()> {
    if parent.can_contain(child) {
        Ok(())
    } else {
        Err(Error::incompatible_parent_child(parent, child))
    }
}

/// Checks that `entity` may be placed under `new_parent`.
///
/// # Errors
///
/// - `MissingParent` when the parent requirement of the type is broken
/// - `UnknownParent` when `new_parent` is not registered
/// - `IncompatibleParentChild` when the table forbids the edge
/// - `CycleDetected` when walking up from `new_parent` reaches `entity`
pub fn validate_parent_change<L>(
    entity: &Entity,
    new_parent: Option<&EntityId>,
    lookup: &L,
) -> Result<()>
where
    L: EntityLookup + ?Sized,
{
    let ty = entity.entity_type();
    let Some(parent) = new_parent else {
        if ty.requires_parent() {
            return Err(Error::missing_parent(ty, format!("{ty} requires a parent")));
        }
        return Ok(());
    };

    if !ty.requires_parent() {
        return Err(Error::missing_parent(ty, format!("{ty} cannot have a parent")));
    }

    let parent_type = lookup
        .type_of(parent)
        .ok_or_else(|| Error::unknown_parent(ty, parent.clone()))?;
    validate_parent_child(parent_type, ty)?;

    let mut seen = HashSet::new();
    let mut current = Some(parent);
    while let Some(node) = current {
        if *node == entity.id || !seen.insert(node) {
            return Err(Error::cycle_detected(entity.id.clone(), parent.clone()));
        }
        current = lookup.parent_of(node);
    }
    Ok(())
}

// =============================================================================
// Batch
// =============================================================================

/// An entity rejected by [`validate_entities`], with the reason.
#[derive(Debug)]
pub struct InvalidEntity {
    /// The rejected entity.
    pub entity: Entity,
    /// Why it was rejected.
    pub error: Error,
}

/// Outcome of a batch validation: the input split into passing and failing
/// entities, each side in input order.
#[derive(Debug, Default)]
pub struct BatchValidation {
    /// Entities that passed.
    pub valid: Vec<Entity>,
    /// Entities that failed, with their errors.
    pub invalid: Vec<InvalidEntity>,
}

impl BatchValidation {
    /// Returns true if every entity passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }

    /// Returns the number of entities examined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    /// Returns true if the batch was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs [`validate_entity`] over every entity without stopping at the first
/// failure.
pub fn validate_entities<I>(entities: I) -> BatchValidation
where
    I: IntoIterator<Item = Entity>,
{
    let mut outcome = BatchValidation::default();
    for entity in entities {
        match validate_entity(&entity) {
            Ok(()) => outcome.valid.push(entity),
            Err(error) => outcome.invalid.push(InvalidEntity { entity, error }),
        }
    }
    outcome
}
