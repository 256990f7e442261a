//! Enumerated and ranged field values shared by the entity records.
//!
//! Every enumeration parses from its canonical snake_case name. Parsing an
//! unknown name reports [`ErrorKind::InvalidEnumValue`](crate::ErrorKind)
//! naming the owning entity type, the field, and the accepted set.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::EntityType;

macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        $name:ident for $owner:ident . $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Canonical names of every value.
            pub const NAMES: &'static [&'static str] = &[$( $text ),+];

            /// Returns the canonical name of this value.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    other => Err(Error::invalid_enum_value(
                        Some(EntityType::$owner),
                        $field,
                        other,
                        Self::NAMES,
                    )),
                }
            }
        }
    };
}

field_enum! {
    /// Which kind of data entity a space collects.
    Collection for Space."collection" {
        /// Breed records.
        Breeds => "breeds",
        /// Individual animals.
        Pets => "pets",
        /// Kennels.
        Kennels => "kennels",
        /// Contacts.
        Contacts => "contacts",
    }
}

impl Collection {
    /// Returns the entity type this collection holds.
    #[must_use]
    pub const fn member_type(self) -> EntityType {
        match self {
            Self::Breeds => EntityType::Breed,
            Self::Pets => EntityType::Pet,
            Self::Kennels => EntityType::Kennel,
            Self::Contacts => EntityType::Contact,
        }
    }
}

field_enum! {
    /// How a view lays out its records.
    ViewLayout for View."layout" {
        /// Rows and columns.
        Table => "table",
        /// Card grid.
        Grid => "grid",
        /// Compact list.
        List => "list",
        /// Board grouped by a field.
        Kanban => "kanban",
    }
}

field_enum! {
    /// Comparison applied by a filter.
    FilterOperator for Filter."operator" {
        /// Field equals value.
        Equals => "equals",
        /// Field differs from value.
        NotEquals => "not_equals",
        /// Field contains value as a substring.
        Contains => "contains",
        /// Field is greater than value.
        GreaterThan => "greater_than",
        /// Field is less than value.
        LessThan => "less_than",
        /// Field is absent or blank.
        IsEmpty => "is_empty",
        /// Field is present.
        IsNotEmpty => "is_not_empty",
    }
}

impl FilterOperator {
    /// Returns true if the operator compares against a value.
    #[must_use]
    pub const fn takes_value(self) -> bool {
        !matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }
}

field_enum! {
    /// Sort order.
    SortDirection for Sort."direction" {
        /// Ascending.
        Asc => "asc",
        /// Descending.
        Desc => "desc",
    }
}

field_enum! {
    /// Breed size class.
    BreedSize for Breed."size" {
        /// Toy breeds.
        Toy => "toy",
        /// Small breeds.
        Small => "small",
        /// Medium breeds.
        Medium => "medium",
        /// Large breeds.
        Large => "large",
        /// Giant breeds.
        Giant => "giant",
    }
}

field_enum! {
    /// Sales and life status of a pet.
    PetStatus for Pet."status" {
        /// Open for reservation.
        Available => "available",
        /// Reserved by a buyer.
        Reserved => "reserved",
        /// Sold.
        Sold => "sold",
        /// Retired from breeding.
        Retired => "retired",
        /// Deceased.
        Deceased => "deceased",
    }
}

field_enum! {
    /// Sex of a pet.
    Sex for Pet."sex" {
        /// Male.
        Male => "male",
        /// Female.
        Female => "female",
    }
}

field_enum! {
    /// Relationship of a contact to the kennel.
    ContactRole for Contact."role" {
        /// Owner of an animal.
        Owner => "owner",
        /// Breeder.
        Breeder => "breeder",
        /// Buyer or prospective buyer.
        Buyer => "buyer",
        /// Veterinarian.
        Veterinarian => "veterinarian",
        /// Anything else.
        Other => "other",
    }
}

/// An inclusive numeric span such as a weight or height range.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValueRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl ValueRange {
    /// Creates a range. Bounds are checked by validation, not here.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns true if `value` lies within the range.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}
