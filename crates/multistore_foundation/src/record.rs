//! Entity records.
//!
//! An [`Entity`] pairs the fields every record shares (id, parent reference,
//! metadata) with an [`EntityData`] variant holding the type-specific fields.
//! The type tag is derived from the variant, so a record can never claim one
//! type while carrying another type's fields.

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::fields::{
    BreedSize, Collection, ContactRole, FilterOperator, PetStatus, Sex, SortDirection, ValueRange,
    ViewLayout,
};
use crate::types::EntityType;

/// Bookkeeping carried by every entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Metadata {
    /// When the entity was created.
    pub created_at: DateTime<Utc>,
    /// When the entity was last committed.
    pub updated_at: DateTime<Utc>,
    /// Commit counter; starts at 1 and grows by one per update.
    pub version: u64,
    /// Free-form labels.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub tags: Vec<String>,
    /// Soft-deletion flag.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_deleted: bool,
    /// When the entity was soft-deleted.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Creates metadata stamped with the current time at version 1.
    #[must_use]
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Creates metadata stamped with the given time at version 1.
    #[must_use]
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            created_at: timestamp,
            updated_at: timestamp,
            version: 1,
            tags: Vec::new(),
            is_deleted: false,
            deleted_at: None,
        }
    }

    /// Records a committed update: bumps the version and refreshes `updated_at`.
    ///
    /// `updated_at` never moves backwards, even if the clock does. Returns the
    /// new version, or `None` without changing anything once the version
    /// counter is exhausted.
    #[must_use]
    pub fn touch(&mut self, now: DateTime<Utc>) -> Option<u64> {
        self.version = self.version.checked_add(1)?;
        self.updated_at = now.max(self.updated_at);
        Some(self.version)
    }

    /// Flags the entity as soft-deleted.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(now);
    }

    /// Clears the soft-deletion flag.
    pub fn restore(&mut self) {
        self.is_deleted = false;
        self.deleted_at = None;
    }

    /// Returns true if the entity carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

/// A record in the entity hierarchy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// The containing entity; `None` only for workspaces.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub parent_id: Option<EntityId>,
    /// Timestamps, version and tags.
    pub metadata: Metadata,
    /// Type-specific fields, tagged by `type`.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub data: EntityData,
}

impl Entity {
    /// Creates a parentless entity with fresh metadata.
    pub fn new(id: impl Into<EntityId>, data: impl Into<EntityData>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            metadata: Metadata::new(),
            data: data.into(),
        }
    }

    /// Sets the parent reference.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<EntityId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    /// Replaces the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.metadata.tags.push(tag.into());
        self
    }

    /// Returns the type discriminator.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.data.entity_type()
    }

    /// Returns the human-facing label: the name, or the field for filters and sorts.
    #[must_use]
    pub fn label(&self) -> &str {
        match &self.data {
            EntityData::Workspace(w) => &w.name,
            EntityData::Space(s) => &s.name,
            EntityData::View(v) => &v.name,
            EntityData::Filter(f) => &f.field,
            EntityData::Sort(s) => &s.field,
            EntityData::Breed(b) => &b.name,
            EntityData::Pet(p) => &p.name,
            EntityData::Kennel(k) => &k.name,
            EntityData::Contact(c) => &c.name,
        }
    }

    /// Returns the ids this entity references besides its parent.
    #[must_use]
    pub fn references(&self) -> Vec<(&'static str, &EntityId)> {
        match &self.data {
            EntityData::Pet(Pet {
                breed_id: Some(breed),
                ..
            }) => vec![("breedId", breed)],
            _ => Vec::new(),
        }
    }
}

/// Type-specific payload of an entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum EntityData {
    /// Workspace fields.
    Workspace(Workspace),
    /// Space fields.
    Space(Space),
    /// View fields.
    View(View),
    /// Filter fields.
    Filter(Filter),
    /// Sort fields.
    Sort(Sort),
    /// Breed fields.
    Breed(Breed),
    /// Pet fields.
    Pet(Pet),
    /// Kennel fields.
    Kennel(Kennel),
    /// Contact fields.
    Contact(Contact),
}

impl EntityData {
    /// Returns the discriminator for this variant.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Workspace(_) => EntityType::Workspace,
            Self::Space(_) => EntityType::Space,
            Self::View(_) => EntityType::View,
            Self::Filter(_) => EntityType::Filter,
            Self::Sort(_) => EntityType::Sort,
            Self::Breed(_) => EntityType::Breed,
            Self::Pet(_) => EntityType::Pet,
            Self::Kennel(_) => EntityType::Kennel,
            Self::Contact(_) => EntityType::Contact,
        }
    }
}

macro_rules! impl_into_data {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl From<$ty> for EntityData {
                fn from(value: $ty) -> Self {
                    Self::$ty(value)
                }
            }
        )+
    };
}

impl_into_data!(Workspace, Space, View, Filter, Sort, Breed, Pet, Kennel, Contact);

/// Top-level container.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Workspace {
    /// Display name.
    pub name: String,
    /// Longer description.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
    /// Icon name.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub icon: Option<String>,
}

impl Workspace {
    /// Creates a workspace with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            icon: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// A collection of one kind of data entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Space {
    /// Display name.
    pub name: String,
    /// What the space collects.
    pub collection: Collection,
    /// Icon name.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub icon: Option<String>,
}

impl Space {
    /// Creates a space.
    pub fn new(name: impl Into<String>, collection: Collection) -> Self {
        Self {
            name: name.into(),
            collection,
            icon: None,
        }
    }

    /// Sets the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// A saved presentation of a space.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct View {
    /// Display name.
    pub name: String,
    /// Layout.
    pub layout: ViewLayout,
    /// Whether the view opens by default.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_default: bool,
}

impl View {
    /// Creates a non-default view.
    pub fn new(name: impl Into<String>, layout: ViewLayout) -> Self {
        Self {
            name: name.into(),
            layout,
            is_default: false,
        }
    }

    /// Marks the view as the default one.
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// A filter clause.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Filter {
    /// The record field being filtered.
    pub field: String,
    /// Comparison.
    pub operator: FilterOperator,
    /// Operand; required unless the operator is an emptiness check.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub value: Option<String>,
}

impl Filter {
    /// Creates a filter without an operand.
    pub fn new(field: impl Into<String>, operator: FilterOperator) -> Self {
        Self {
            field: field.into(),
            operator,
            value: None,
        }
    }

    /// Sets the operand.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A sort clause.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Sort {
    /// The record field being sorted on.
    pub field: String,
    /// Order.
    pub direction: SortDirection,
    /// Position among the view's sorts; lower runs first.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: u32,
}

impl Sort {
    /// Creates a sort clause with priority 0.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
            priority: 0,
        }
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

/// A dog breed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Breed {
    /// Breed name.
    pub name: String,
    /// Size class.
    pub size: BreedSize,
    /// Country or region of origin.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub origin: Option<String>,
    /// Adult weight in kilograms.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub weight: Option<ValueRange>,
    /// Adult height in centimetres.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub height: Option<ValueRange>,
    /// Life expectancy in years.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub life_expectancy: Option<ValueRange>,
    /// Rating from 0 to 5.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub rating: Option<f64>,
}

impl Breed {
    /// Creates a breed with only the required fields.
    pub fn new(name: impl Into<String>, size: BreedSize) -> Self {
        Self {
            name: name.into(),
            size,
            origin: None,
            weight: None,
            height: None,
            life_expectancy: None,
            rating: None,
        }
    }

    /// Sets the origin.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Sets the weight range.
    #[must_use]
    pub fn with_weight(mut self, min: f64, max: f64) -> Self {
        self.weight = Some(ValueRange::new(min, max));
        self
    }

    /// Sets the height range.
    #[must_use]
    pub fn with_height(mut self, min: f64, max: f64) -> Self {
        self.height = Some(ValueRange::new(min, max));
        self
    }

    /// Sets the life expectancy range.
    #[must_use]
    pub fn with_life_expectancy(mut self, min: f64, max: f64) -> Self {
        self.life_expectancy = Some(ValueRange::new(min, max));
        self
    }

    /// Sets the rating.
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// An individual animal.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Pet {
    /// Call name.
    pub name: String,
    /// Sales and life status.
    pub status: PetStatus,
    /// The breed record this animal belongs to.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub breed_id: Option<EntityId>,
    /// Sex.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub sex: Option<Sex>,
    /// Date of birth.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub birth_date: Option<DateTime<Utc>>,
    /// Current weight in kilograms.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub weight_kg: Option<f64>,
    /// Microchip number.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub microchip: Option<String>,
}

impl Pet {
    /// Creates a pet with only the required fields.
    pub fn new(name: impl Into<String>, status: PetStatus) -> Self {
        Self {
            name: name.into(),
            status,
            breed_id: None,
            sex: None,
            birth_date: None,
            weight_kg: None,
            microchip: None,
        }
    }

    /// Sets the breed reference.
    #[must_use]
    pub fn with_breed(mut self, breed: impl Into<EntityId>) -> Self {
        self.breed_id = Some(breed.into());
        self
    }

    /// Sets the sex.
    #[must_use]
    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    /// Sets the birth date.
    #[must_use]
    pub fn with_birth_date(mut self, birth_date: DateTime<Utc>) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    /// Sets the weight.
    #[must_use]
    pub fn with_weight(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    /// Sets the microchip number.
    #[must_use]
    pub fn with_microchip(mut self, microchip: impl Into<String>) -> Self {
        self.microchip = Some(microchip.into());
        self
    }
}

/// A breeding kennel.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Kennel {
    /// Kennel name.
    pub name: String,
    /// Registry number with the kennel club.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub registration_number: Option<String>,
    /// Year the kennel was founded.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub established_year: Option<u16>,
    /// Rating from 0 to 5.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub rating: Option<f64>,
}

impl Kennel {
    /// Creates a kennel with only its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registration_number: None,
            established_year: None,
            rating: None,
        }
    }

    /// Sets the registration number.
    #[must_use]
    pub fn with_registration(mut self, number: impl Into<String>) -> Self {
        self.registration_number = Some(number.into());
        self
    }

    /// Sets the founding year.
    #[must_use]
    pub fn with_established_year(mut self, year: u16) -> Self {
        self.established_year = Some(year);
        self
    }

    /// Sets the rating.
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// A person or organisation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Contact {
    /// Full name.
    pub name: String,
    /// Relationship to the kennel.
    pub role: ContactRole,
    /// Email address.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub email: Option<String>,
    /// Phone number.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub phone: Option<String>,
}

impl Contact {
    /// Creates a contact with only the required fields.
    pub fn new(name: impl Into<String>, role: ContactRole) -> Self {
        Self {
            name: name.into(),
            role,
            email: None,
            phone: None,
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}
