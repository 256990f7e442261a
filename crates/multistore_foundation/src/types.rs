//! The entity type registry.
//!
//! [`EntityType`] is the static catalog of entity variants. It answers which
//! child types a type may contain, whether a type needs a parent, and which
//! fields a type requires. None of this changes at runtime.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Discriminator for every entity variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EntityType {
    /// Top-level container; the only type without a parent.
    Workspace,
    /// A collection inside a workspace.
    Space,
    /// A saved presentation of a space.
    View,
    /// A filter clause belonging to a view.
    Filter,
    /// A sort clause belonging to a view.
    Sort,
    /// A dog breed record.
    Breed,
    /// An individual animal.
    Pet,
    /// A breeding kennel.
    Kennel,
    /// A person or organisation.
    Contact,
}

impl EntityType {
    /// Every entity type, in export order.
    pub const ALL: [EntityType; 9] = [
        EntityType::Workspace,
        EntityType::Space,
        EntityType::View,
        EntityType::Filter,
        EntityType::Sort,
        EntityType::Breed,
        EntityType::Pet,
        EntityType::Kennel,
        EntityType::Contact,
    ];

    /// Returns the canonical lowercase name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Space => "space",
            Self::View => "view",
            Self::Filter => "filter",
            Self::Sort => "sort",
            Self::Breed => "breed",
            Self::Pet => "pet",
            Self::Kennel => "kennel",
            Self::Contact => "contact",
        }
    }

    /// Returns the types this type may directly contain.
    #[must_use]
    pub const fn allowed_children(self) -> &'static [EntityType] {
        match self {
            Self::Workspace => &[Self::Space],
            Self::Space => &[Self::View, Self::Breed, Self::Pet, Self::Kennel, Self::Contact],
            Self::View => &[Self::Filter, Self::Sort],
            Self::Filter | Self::Sort | Self::Breed | Self::Pet | Self::Kennel | Self::Contact => {
                &[]
            }
        }
    }

    /// Returns true if `child` may be placed directly under this type.
    #[must_use]
    pub fn can_contain(self, child: EntityType) -> bool {
        self.allowed_children().contains(&child)
    }

    /// Returns true if this type can never have children.
    #[must_use]
    pub const fn is_leaf(self) -> bool {
        self.allowed_children().is_empty()
    }

    /// Returns true if entities of this type must reference a parent.
    #[must_use]
    pub const fn requires_parent(self) -> bool {
        !matches!(self, Self::Workspace)
    }

    /// Returns the fields every entity of this type must carry.
    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Workspace | Self::Kennel => &["name"],
            Self::Space => &["name", "collection"],
            Self::View => &["name", "layout"],
            Self::Filter => &["field", "operator"],
            Self::Sort => &["field", "direction"],
            Self::Breed => &["name", "size"],
            Self::Pet => &["name", "status"],
            Self::Contact => &["name", "role"],
        }
    }

    /// Returns the canonical names of all types.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.as_str()).collect()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::invalid_enum_value(None, "type", s, &Self::names()))
    }
}
