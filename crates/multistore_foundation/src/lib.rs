//! Core identifiers, entity records, type registry and errors for MultiStore.
//!
//! This crate provides:
//! - [`EntityId`] - Opaque, cheaply cloned entity identifiers
//! - [`EntityType`] - The type registry and parent-child compatibility table
//! - [`Entity`] / [`EntityData`] - Typed entity records with [`Metadata`]
//! - Field enumerations such as [`BreedSize`] and [`PetStatus`]
//! - [`Error`] - Structured errors with kind and context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entity;
pub mod error;
pub mod fields;
pub mod record;
pub mod types;

pub use entity::EntityId;
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use fields::{
    BreedSize, Collection, ContactRole, FilterOperator, PetStatus, Sex, SortDirection, ValueRange,
    ViewLayout,
};
pub use record::{
    Breed, Contact, Entity, EntityData, Filter, Kennel, Metadata, Pet, Sort, Space, View,
    Workspace,
};
pub use types::EntityType;
