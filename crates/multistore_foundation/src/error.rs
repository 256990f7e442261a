//! Error types for MultiStore.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every validation failure names the entity type, and where meaningful the
//! offending field and value, so callers can report it without parsing text.

use std::fmt;

use thiserror::Error;

use crate::entity::EntityId;
use crate::types::EntityType;

/// Result alias used throughout MultiStore.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for MultiStore operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a missing field error.
    #[must_use]
    pub fn missing_field(entity_type: EntityType, field: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingField {
            entity_type,
            field: field.into(),
        })
    }

    /// Creates an invalid enumeration value error.
    #[must_use]
    pub fn invalid_enum_value(
        entity_type: Option<EntityType>,
        field: impl Into<String>,
        value: impl Into<String>,
        allowed: &[&str],
    ) -> Self {
        Self::new(ErrorKind::InvalidEnumValue {
            entity_type,
            field: field.into(),
            value: value.into(),
            allowed: allowed.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    /// Creates a numeric range violation error.
    #[must_use]
    pub fn invalid_range(
        entity_type: EntityType,
        field: impl Into<String>,
        value: impl fmt::Display,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::InvalidRange {
            entity_type,
            field: field.into(),
            value: value.to_string(),
            message: message.into(),
        })
    }

    /// Creates a parent requirement error.
    #[must_use]
    pub fn missing_parent(entity_type: EntityType, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingParent {
            entity_type,
            message: message.into(),
        })
    }

    /// Creates an unknown parent error.
    #[must_use]
    pub fn unknown_parent(entity_type: EntityType, parent: EntityId) -> Self {
        Self::new(ErrorKind::UnknownParent {
            entity_type,
            parent,
        })
    }

    /// Creates an incompatible parent-child error.
    #[must_use]
    pub fn incompatible_parent_child(parent: EntityType, child: EntityType) -> Self {
        Self::new(ErrorKind::IncompatibleParentChild {
            parent,
            child,
            allowed: parent.allowed_children().to_vec(),
        })
    }

    /// Creates a cycle detected error.
    #[must_use]
    pub fn cycle_detected(entity: EntityId, parent: EntityId) -> Self {
        Self::new(ErrorKind::CycleDetected { entity, parent })
    }

    /// Creates an immutable field violation error.
    #[must_use]
    pub fn immutable_field(entity: EntityId, field: impl Into<String>) -> Self {
        Self::new(ErrorKind::ImmutableFieldViolation {
            entity,
            field: field.into(),
        })
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn not_found(id: EntityId) -> Self {
        Self::new(ErrorKind::NotFound(id))
    }

    /// Creates a duplicate id error.
    #[must_use]
    pub fn duplicate_id(id: EntityId) -> Self {
        Self::new(ErrorKind::DuplicateId(id))
    }

    /// Creates a retired id error.
    #[must_use]
    pub fn retired_id(id: EntityId) -> Self {
        Self::new(ErrorKind::RetiredId(id))
    }

    /// Creates a "still has children" error.
    #[must_use]
    pub fn has_children(entity: EntityId, children: usize) -> Self {
        Self::new(ErrorKind::HasChildren { entity, children })
    }

    /// Creates a dangling cross-reference error.
    #[must_use]
    pub fn unknown_reference(
        entity_type: EntityType,
        field: impl Into<String>,
        target: EntityId,
    ) -> Self {
        Self::new(ErrorKind::UnknownReference {
            entity_type,
            field: field.into(),
            target,
        })
    }

    /// Creates an unsupported snapshot format error.
    #[must_use]
    pub fn unsupported_format(found: u32, supported: u32) -> Self {
        Self::new(ErrorKind::UnsupportedFormat { found, supported })
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization(message.into()))
    }

    /// Returns the entity type the error concerns, if any.
    #[must_use]
    pub fn entity_type(&self) -> Option<EntityType> {
        match &self.kind {
            ErrorKind::MissingField { entity_type, .. }
            | ErrorKind::InvalidRange { entity_type, .. }
            | ErrorKind::MissingParent { entity_type, .. }
            | ErrorKind::UnknownParent { entity_type, .. }
            | ErrorKind::UnknownReference { entity_type, .. } => Some(*entity_type),
            ErrorKind::InvalidEnumValue { entity_type, .. } => *entity_type,
            ErrorKind::IncompatibleParentChild { child, .. } => Some(*child),
            _ => self.context.as_ref().and_then(|c| c.entity_type),
        }
    }

    /// Returns the field the error concerns, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::MissingField { field, .. }
            | ErrorKind::InvalidEnumValue { field, .. }
            | ErrorKind::InvalidRange { field, .. }
            | ErrorKind::ImmutableFieldViolation { field, .. }
            | ErrorKind::UnknownReference { field, .. } => Some(field.as_str()),
            ErrorKind::MissingParent { .. }
            | ErrorKind::UnknownParent { .. }
            | ErrorKind::IncompatibleParentChild { .. }
            | ErrorKind::CycleDetected { .. } => Some("parentId"),
            _ => None,
        }
    }

    /// Returns the offending value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::InvalidEnumValue { value, .. } | ErrorKind::InvalidRange { value, .. } => {
                Some(value.as_str())
            }
            ErrorKind::UnknownParent { parent, .. } | ErrorKind::CycleDetected { parent, .. } => {
                Some(parent.as_str())
            }
            ErrorKind::UnknownReference { target, .. } => Some(target.as_str()),
            _ => None,
        }
    }

    /// Returns true if the error is a validation failure rather than a
    /// lookup, bookkeeping or codec failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::MissingField { .. }
                | ErrorKind::InvalidEnumValue { .. }
                | ErrorKind::InvalidRange { .. }
                | ErrorKind::MissingParent { .. }
                | ErrorKind::UnknownParent { .. }
                | ErrorKind::IncompatibleParentChild { .. }
                | ErrorKind::CycleDetected { .. }
                | ErrorKind::ImmutableFieldViolation { .. }
                | ErrorKind::UnknownReference { .. }
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A required field is absent or blank.
    #[error("{entity_type}: missing required field `{field}`")]
    MissingField {
        /// Type of the entity being validated.
        entity_type: EntityType,
        /// The missing field.
        field: String,
    },

    /// A value lies outside its enumeration.
    #[error("invalid value {value:?} for `{field}`, expected one of: {}", .allowed.join(", "))]
    InvalidEnumValue {
        /// Type of the entity being validated, when known.
        entity_type: Option<EntityType>,
        /// The field holding the value.
        field: String,
        /// The rejected value.
        value: String,
        /// The accepted values.
        allowed: Vec<String>,
    },

    /// A numeric invariant is violated.
    #[error("{entity_type}: `{field}` = {value} is out of range: {message}")]
    InvalidRange {
        /// Type of the entity being validated.
        entity_type: EntityType,
        /// The field holding the value.
        field: String,
        /// The rejected value.
        value: String,
        /// Description of the violated bound.
        message: String,
    },

    /// A parent is required but absent, or given where none is allowed.
    #[error("{entity_type}: {message}")]
    MissingParent {
        /// Type of the entity being validated.
        entity_type: EntityType,
        /// What is wrong with the parent reference.
        message: String,
    },

    /// The parent reference does not resolve to a registered entity.
    #[error("{entity_type}: parent {parent} is not registered")]
    UnknownParent {
        /// Type of the child entity.
        entity_type: EntityType,
        /// The unresolved parent id.
        parent: EntityId,
    },

    /// The parent's type does not permit the child's type.
    #[error("{parent} cannot contain {child}; allowed children: {}", display_types(.allowed))]
    IncompatibleParentChild {
        /// Type of the parent.
        parent: EntityType,
        /// Type of the rejected child.
        child: EntityType,
        /// Types the parent does accept.
        allowed: Vec<EntityType>,
    },

    /// Reparenting would make an entity its own ancestor.
    #[error("moving {entity} under {parent} would create a cycle")]
    CycleDetected {
        /// The entity being moved.
        entity: EntityId,
        /// The proposed parent.
        parent: EntityId,
    },

    /// An update attempted to change `id` or `type`.
    #[error("field `{field}` of {entity} is immutable")]
    ImmutableFieldViolation {
        /// The entity being updated.
        entity: EntityId,
        /// The immutable field.
        field: String,
    },

    /// The targeted entity is not registered.
    #[error("entity not found: {0}")]
    NotFound(EntityId),

    /// An entity with this id is already registered.
    #[error("entity already exists: {0}")]
    DuplicateId(EntityId),

    /// The id belonged to a removed entity and cannot be reused.
    #[error("entity id was retired and cannot be reused: {0}")]
    RetiredId(EntityId),

    /// Non-cascading removal of an entity that still has children.
    #[error("{entity} still has {children} child entities; remove with cascade")]
    HasChildren {
        /// The entity that was to be removed.
        entity: EntityId,
        /// Number of direct children.
        children: usize,
    },

    /// A cross-reference field points at an entity that is not registered.
    #[error("{entity_type}: `{field}` references unknown entity {target}")]
    UnknownReference {
        /// Type of the referencing entity.
        entity_type: EntityType,
        /// The reference field.
        field: String,
        /// The unresolved id.
        target: EntityId,
    },

    /// The snapshot was produced by an incompatible format version.
    #[error("unsupported snapshot format version {found} (supported: {supported})")]
    UnsupportedFormat {
        /// Version found in the snapshot.
        found: u32,
        /// Version this build reads and writes.
        supported: u32,
    },

    /// Encoding or decoding a snapshot failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

fn display_types(types: &[EntityType]) -> String {
    if types.is_empty() {
        return "none".to_string();
    }
    types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The entity being processed.
    pub entity_id: Option<EntityId>,
    /// Its type, when known.
    pub entity_type: Option<EntityType>,
    /// The store operation that failed.
    pub operation: Option<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entity.
    #[must_use]
    pub fn with_entity(mut self, id: EntityId, entity_type: EntityType) -> Self {
        self.entity_id = Some(id);
        self.entity_type = Some(entity_type);
        self
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(op) = &self.operation {
            write!(f, "in {op}")?;
        }
        if let Some(id) = &self.entity_id {
            if self.operation.is_some() {
                f.write_str(" ")?;
            }
            write!(f, "at {id}")?;
            if let Some(ty) = self.entity_type {
                write!(f, " ({ty})")?;
            }
        }
        Ok(())
    }
}
