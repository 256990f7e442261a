//! The entity store.
//!
//! [`MultiStore`] owns the entity table and the [`RelationshipIndex`] and is
//! the only thing that mutates either. Every mutation validates first,
//! registers in the index second and commits to the table last; a failed
//! call leaves both untouched.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::Utc;
use multistore_foundation::{Entity, EntityId, EntityType, Error, ErrorContext, Result};
use tracing::debug;

use crate::config::StoreConfig;
use crate::relationship::RelationshipIndex;
use crate::validate::{validate_entity, validate_parent_change, validate_parent_child};

/// In-memory hierarchical store of typed entities.
#[derive(Clone, Debug, Default)]
pub struct MultiStore {
    /// Entity table.
    entities: HashMap<EntityId, Entity>,
    /// Hierarchy, type membership and active slots.
    index: RelationshipIndex,
    /// Ids of removed entities; never re-registered unless recycling is on.
    retired: HashSet<EntityId>,
    config: StoreConfig,
}

impl MultiStore {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store with the given configuration.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            entities: HashMap::new(),
            index: RelationshipIndex::with_max_depth(config.max_ancestor_depth),
            retired: HashSet::new(),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the relationship index, read-only.
    #[must_use]
    pub fn index(&self) -> &RelationshipIndex {
        &self.index
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the store holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Removes every entity, every active slot and the retired id list.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.index.clear();
        self.retired.clear();
        debug!("store cleared");
    }

    // --- Mutation ---

    /// Validates and commits a single entity.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed entity, `DuplicateId` or
    /// `RetiredId` for an id that cannot be used, `UnknownParent` if the
    /// parent is not registered, or `IncompatibleParentChild`. Nothing is
    /// changed on error.
    pub fn add_entity(&mut self, entity: Entity) -> Result<()> {
        let check = validate_entity(&entity)
            .and_then(|()| self.check_new_id(&entity.id))
            .and_then(|()| self.check_parent(&entity, |id| self.index.entity_type(id)));
        if let Err(err) = check {
            return Err(in_operation(err, "add_entity", &entity));
        }

        self.commit_new(entity);
        Ok(())
    }

    /// Commits a batch of entities given in any order.
    ///
    /// Entities whose parent is part of the same batch are committed after
    /// that parent; the rest keep their input order. The whole batch is
    /// checked before anything is committed, so either every entity is
    /// added or none is. Returns the ids in commit order.
    ///
    /// # Errors
    ///
    /// Fails with the first problem found: a validation error, `DuplicateId`
    /// for an id repeated in the batch or already registered, `RetiredId`,
    /// `CycleDetected` when parents within the batch form a loop, or an
    /// unknown or incompatible parent.
    pub fn add_entities(&mut self, entities: Vec<Entity>) -> Result<Vec<EntityId>> {
        let mut batch_ids = HashSet::with_capacity(entities.len());
        for entity in &entities {
            validate_entity(entity).map_err(|e| in_operation(e, "add_entities", entity))?;
            if !batch_ids.insert(entity.id.clone()) {
                return Err(in_operation(
                    Error::duplicate_id(entity.id.clone()),
                    "add_entities",
                    entity,
                ));
            }
        }

        let ordered = order_by_parent(entities, &batch_ids)?;

        let mut staged: HashMap<EntityId, EntityType> = HashMap::with_capacity(ordered.len());
        for entity in &ordered {
            self.check_new_id(&entity.id)
                .and_then(|()| {
                    self.check_parent(entity, |id| {
                        self.index
                            .entity_type(id)
                            .or_else(|| staged.get(id).copied())
                    })
                })
                .map_err(|e| in_operation(e, "add_entities", entity))?;
            staged.insert(entity.id.clone(), entity.entity_type());
        }

        let ids = ordered.iter().map(|e| e.id.clone()).collect();
        for entity in ordered {
            self.commit_new(entity);
        }
        Ok(ids)
    }

    /// Applies `change` to a copy of an entity and commits the result.
    ///
    /// The copy is re-validated, including any new parent. On commit the
    /// version grows by one and `updated_at` is refreshed; `created_at` is
    /// kept whatever the closure did to it.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `ImmutableFieldViolation` if the change
    /// touched the id or the type, any validation error for the result, or
    /// `InvalidRange` on `version` once the counter cannot grow.
    pub fn update_entity<F>(&mut self, id: &EntityId, change: F) -> Result<&Entity>
    where
        F: FnOnce(&mut Entity),
    {
        let current = self
            .entities
            .get(id)
            .ok_or_else(|| Error::not_found(id.clone()))?;
        let mut next = current.clone();
        change(&mut next);

        if next.id != *id {
            return Err(in_operation(
                Error::immutable_field(id.clone(), "id"),
                "update_entity",
                current,
            ));
        }
        if next.entity_type() != current.entity_type() {
            return Err(in_operation(
                Error::immutable_field(id.clone(), "type"),
                "update_entity",
                current,
            ));
        }

        next.metadata.created_at = current.metadata.created_at;
        next.metadata.updated_at = current.metadata.updated_at;
        next.metadata.version = current.metadata.version;

        validate_entity(&next).map_err(|e| in_operation(e, "update_entity", current))?;
        let reparented = next.parent_id != current.parent_id;
        if reparented {
            validate_parent_change(&next, next.parent_id.as_ref(), &self.index)
                .map_err(|e| in_operation(e, "update_entity", current))?;
        }

        if next.metadata.touch(Utc::now()).is_none() {
            let exhausted = Error::invalid_range(
                next.entity_type(),
                "version",
                current.metadata.version,
                "cannot be incremented further",
            );
            return Err(in_operation(exhausted, "update_entity", current));
        }
        if reparented {
            self.index.update_parent(id, next.parent_id.as_ref());
        }
        debug!(
            id = %id,
            entity_type = %next.entity_type(),
            version = next.metadata.version,
            reparented,
            "entity updated"
        );

        let slot = self
            .entities
            .get_mut(id)
            .ok_or_else(|| Error::not_found(id.clone()))?;
        *slot = next;
        Ok(&*slot)
    }

    /// Moves an entity under a new parent.
    ///
    /// # Errors
    ///
    /// As [`update_entity`](Self::update_entity).
    pub fn move_entity(&mut self, id: &EntityId, new_parent: Option<EntityId>) -> Result<&Entity> {
        self.update_entity(id, |entity| entity.parent_id = new_parent)
    }

    /// Removes an entity, and with `cascade` every entity below it.
    ///
    /// The removal set is computed before anything is touched and is applied
    /// leaves first. Returns the removed ids in removal order.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id; `HasChildren` if the entity has children
    /// and `cascade` is false.
    pub fn remove_entity(&mut self, id: &EntityId, cascade: bool) -> Result<Vec<EntityId>> {
        if !self.entities.contains_key(id) {
            return Err(Error::not_found(id.clone()));
        }

        if !cascade && self.index.has_children(id) {
            return Err(Error::has_children(id.clone(), self.index.children(id).len()));
        }

        // Reversed breadth-first order puts every node before its parent
        let mut doomed = self.index.descendants(id);
        doomed.reverse();
        doomed.push(id.clone());

        self.index.unregister_all(&doomed);
        for victim in &doomed {
            self.entities.remove(victim);
            if !self.config.recycle_ids {
                self.retired.insert(victim.clone());
            }
        }

        debug!(id = %id, removed = doomed.len(), cascade, "entity removed");
        Ok(doomed)
    }

    fn check_new_id(&self, id: &EntityId) -> Result<()> {
        if self.entities.contains_key(id) {
            return Err(Error::duplicate_id(id.clone()));
        }
        if !self.config.recycle_ids && self.retired.contains(id) {
            return Err(Error::retired_id(id.clone()));
        }
        Ok(())
    }

    /// Resolves the declared parent through `type_of` and checks the edge.
    fn check_parent<F>(&self, entity: &Entity, type_of: F) -> Result<()>
    where
        F: Fn(&EntityId) -> Option<EntityType>,
    {
        let Some(parent) = &entity.parent_id else {
            return Ok(());
        };
        let ty = entity.entity_type();
        let parent_type =
            type_of(parent).ok_or_else(|| Error::unknown_parent(ty, parent.clone()))?;
        validate_parent_child(parent_type, ty)
    }

    fn commit_new(&mut self, entity: Entity) {
        self.index.register(&entity);
        debug!(
            id = %entity.id,
            entity_type = %entity.entity_type(),
            parent = ?entity.parent_id.as_ref().map(EntityId::as_str),
            "entity added"
        );
        self.retired.remove(&entity.id);
        self.entities.insert(entity.id.clone(), entity);
    }

    // --- Queries ---

    /// Returns an entity by id.
    #[must_use]
    pub fn get_entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Returns true if the id is registered.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Iterates entities in export order: types in registry order,
    /// insertion order within a type.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.index.ids().filter_map(|id| self.entities.get(id))
    }

    /// Returns the direct children of an entity, in insertion order.
    #[must_use]
    pub fn get_entities_by_parent(&self, parent: &EntityId) -> Vec<&Entity> {
        self.resolve(self.index.children(parent))
    }

    /// Returns every entity of a type, in insertion order.
    #[must_use]
    pub fn get_entities_by_type(&self, ty: EntityType) -> Vec<&Entity> {
        self.resolve(self.index.ids_of_type(ty))
    }

    /// Returns the entities matching `predicate`, in export order.
    pub fn find_entities<P>(&self, mut predicate: P) -> Vec<&Entity>
    where
        P: FnMut(&Entity) -> bool,
    {
        self.iter().filter(|e| predicate(e)).collect()
    }

    /// Returns the ids of an entity's direct children.
    #[must_use]
    pub fn get_children(&self, id: &EntityId) -> &[EntityId] {
        self.index.children(id)
    }

    /// Returns the other children of an entity's parent.
    #[must_use]
    pub fn get_siblings(&self, id: &EntityId) -> Vec<EntityId> {
        self.index.siblings(id)
    }

    /// Returns an entity's ancestors, nearest first.
    #[must_use]
    pub fn get_ancestors(&self, id: &EntityId) -> Vec<EntityId> {
        self.index.ancestors(id)
    }

    /// Returns an entity's descendants, breadth first.
    #[must_use]
    pub fn get_descendants(&self, id: &EntityId) -> Vec<EntityId> {
        self.index.descendants(id)
    }

    /// Returns the depth of an entity (roots are 0), or `None` if unknown.
    #[must_use]
    pub fn get_depth(&self, id: &EntityId) -> Option<usize> {
        self.contains(id).then(|| self.index.depth(id))
    }

    /// Returns the ids from the root down to the entity; empty if unknown.
    #[must_use]
    pub fn get_path(&self, id: &EntityId) -> Vec<EntityId> {
        if self.contains(id) {
            self.index.path(id)
        } else {
            Vec::new()
        }
    }

    /// Returns true if `ancestor` is above `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &EntityId, id: &EntityId) -> bool {
        self.index.is_ancestor(ancestor, id)
    }

    /// Returns true if `id` is below `ancestor`.
    #[must_use]
    pub fn is_descendant(&self, id: &EntityId, ancestor: &EntityId) -> bool {
        self.index.is_descendant(id, ancestor)
    }

    /// Builds the tree rooted at `root`, or `None` if it is not registered.
    #[must_use]
    pub fn get_hierarchy(&self, root: &EntityId) -> Option<HierarchyNode<'_>> {
        let (root, _) = self.entities.get_key_value(root)?;
        let mut visited = HashSet::new();
        self.build_node(root, &mut visited)
    }

    fn build_node<'a>(
        &'a self,
        id: &'a EntityId,
        visited: &mut HashSet<&'a EntityId>,
    ) -> Option<HierarchyNode<'a>> {
        let entity = self.entities.get(id)?;
        if !visited.insert(id) {
            tracing::warn!(entity = %id, "revisited node while building hierarchy");
            return None;
        }
        let children = self
            .index
            .children(id)
            .iter()
            .filter_map(|child| self.build_node(child, visited))
            .collect();
        Some(HierarchyNode { entity, children })
    }

    fn resolve<'a>(&'a self, ids: &[EntityId]) -> Vec<&'a Entity> {
        ids.iter().filter_map(|id| self.entities.get(id)).collect()
    }

    // --- Selection ---

    /// Makes an entity the active one of its type.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is not registered.
    pub fn set_active_entity(&mut self, id: &EntityId) -> Result<()> {
        if self.contains(id) && self.index.set_active(id) {
            Ok(())
        } else {
            Err(Error::not_found(id.clone()))
        }
    }

    /// Returns the active entity of a type.
    #[must_use]
    pub fn get_active_entity(&self, ty: EntityType) -> Option<&Entity> {
        self.index.active(ty).and_then(|id| self.entities.get(id))
    }

    /// Returns the active id of a type.
    #[must_use]
    pub fn active_id(&self, ty: EntityType) -> Option<&EntityId> {
        self.index.active(ty)
    }

    /// Clears the active slot of a type, returning the id it held.
    pub fn clear_active(&mut self, ty: EntityType) -> Option<EntityId> {
        self.index.clear_active(ty)
    }

    // --- Consistency ---

    /// Audits the whole store without changing it.
    ///
    /// Re-validates every entity and parent edge, checks that the index and
    /// the table agree, and, when enabled, checks cross-references.
    #[must_use]
    pub fn validate_store(&self) -> ValidationReport {
        let mut errors = Vec::new();

        for entity in self.audit_order() {
            let id = &entity.id;
            let fail = |error: Error| StoreViolation::Entity {
                id: id.clone(),
                error,
            };

            if let Err(error) = validate_entity(entity) {
                errors.push(fail(error));
            } else if entity.parent_id.is_some() {
                if let Err(error) =
                    validate_parent_change(entity, entity.parent_id.as_ref(), &self.entities)
                {
                    errors.push(fail(error));
                }
            }

            if self.config.check_references {
                for (field, target) in entity.references() {
                    if !self.entities.contains_key(target) {
                        errors.push(fail(Error::unknown_reference(
                            entity.entity_type(),
                            field,
                            target.clone(),
                        )));
                    }
                }
            }

            match self.index.entity_type(id) {
                None => errors.push(StoreViolation::index_mismatch(id, "missing from the index")),
                Some(ty) if ty != entity.entity_type() => errors.push(
                    StoreViolation::index_mismatch(id, format!("indexed as {ty}")),
                ),
                Some(_) => {}
            }
            if self.index.parent(id) != entity.parent_id.as_ref() {
                errors.push(StoreViolation::index_mismatch(
                    id,
                    "indexed parent differs from parentId",
                ));
            }
        }

        for id in self.index.ids() {
            if !self.entities.contains_key(id) {
                errors.push(StoreViolation::index_mismatch(id, "indexed but not stored"));
            }
        }
        for (ty, id) in self.index.active_slots() {
            if self.entities.get(&id).map(Entity::entity_type) != Some(ty) {
                errors.push(StoreViolation::index_mismatch(
                    &id,
                    format!("active {ty} slot does not hold a stored {ty}"),
                ));
            }
        }

        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Table entries in export order, then any the index lost, sorted by id.
    fn audit_order(&self) -> Vec<&Entity> {
        let mut order: Vec<&Entity> = self.iter().collect();
        let mut strays: Vec<&Entity> = self
            .entities
            .values()
            .filter(|e| !self.index.contains(&e.id))
            .collect();
        strays.sort_by(|a, b| a.id.cmp(&b.id));
        order.extend(strays);
        order
    }

    /// Summarizes the store.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let per_type = EntityType::ALL
            .iter()
            .map(|ty| (*ty, self.index.ids_of_type(*ty).len()))
            .filter(|(_, count)| *count > 0)
            .collect();
        let max_depth = self
            .index
            .ids()
            .map(|id| self.index.depth(id))
            .max()
            .unwrap_or(0);

        StoreStats {
            total: self.entities.len(),
            per_type,
            roots: self.index.roots().len(),
            max_depth,
        }
    }
}

/// Places every entity after its parent when both are in the batch.
fn order_by_parent(entities: Vec<Entity>, batch_ids: &HashSet<EntityId>) -> Result<Vec<Entity>> {
    let mut ordered = Vec::with_capacity(entities.len());
    let mut placed: HashSet<EntityId> = HashSet::with_capacity(entities.len());
    let mut waiting: HashMap<EntityId, Vec<(usize, Entity)>> = HashMap::new();

    for (position, entity) in entities.into_iter().enumerate() {
        match &entity.parent_id {
            Some(parent) if batch_ids.contains(parent) && !placed.contains(parent) => {
                waiting
                    .entry(parent.clone())
                    .or_default()
                    .push((position, entity));
            }
            _ => {
                let mut stack = vec![entity];
                while let Some(next) = stack.pop() {
                    if let Some(children) = waiting.remove(&next.id) {
                        stack.extend(children.into_iter().rev().map(|(_, e)| e));
                    }
                    placed.insert(next.id.clone());
                    ordered.push(next);
                }
            }
        }
    }

    // Whatever still waits hangs off a loop inside the batch
    let stuck = waiting
        .into_values()
        .flatten()
        .min_by_key(|(position, _)| *position);
    if let Some((_, entity)) = stuck {
        let parent = entity.parent_id.clone().unwrap_or_else(|| entity.id.clone());
        return Err(in_operation(
            Error::cycle_detected(entity.id.clone(), parent),
            "add_entities",
            &entity,
        ));
    }

    Ok(ordered)
}

fn in_operation(error: Error, operation: &str, entity: &Entity) -> Error {
    if error.context.is_some() {
        return error;
    }
    error.with_context(
        ErrorContext::new()
            .with_entity(entity.id.clone(), entity.entity_type())
            .with_operation(operation),
    )
}

// =============================================================================
// Query Results
// =============================================================================

/// A node of the tree returned by [`MultiStore::get_hierarchy`].
#[derive(Clone, Debug, PartialEq)]
pub struct HierarchyNode<'a> {
    /// The entity at this node.
    pub entity: &'a Entity,
    /// Child nodes, in insertion order.
    pub children: Vec<HierarchyNode<'a>>,
}

impl HierarchyNode<'_> {
    /// Returns the number of nodes in this subtree, itself included.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(HierarchyNode::len).sum::<usize>()
    }

    /// Always false: a node contains at least itself.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the ids of this subtree in pre-order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<EntityId>) {
        out.push(self.entity.id.clone());
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}

/// A problem found by [`MultiStore::validate_store`].
#[derive(Debug)]
pub enum StoreViolation {
    /// A stored entity fails validation, has a bad parent edge or a dangling
    /// reference.
    Entity {
        /// The offending entity.
        id: EntityId,
        /// What is wrong with it.
        error: Error,
    },
    /// The index and the table disagree about an id.
    IndexMismatch {
        /// The id they disagree about.
        id: EntityId,
        /// How they disagree.
        message: String,
    },
}

impl StoreViolation {
    fn index_mismatch(id: &EntityId, message: impl Into<String>) -> Self {
        Self::IndexMismatch {
            id: id.clone(),
            message: message.into(),
        }
    }

    /// Returns the id the violation concerns.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Entity { id, .. } | Self::IndexMismatch { id, .. } => id,
        }
    }

    /// Returns the underlying error for entity violations.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Entity { error, .. } => Some(error),
            Self::IndexMismatch { .. } => None,
        }
    }
}

impl fmt::Display for StoreViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity { id, error } => write!(f, "{id}: {error}"),
            Self::IndexMismatch { id, message } => write!(f, "{id}: index mismatch: {message}"),
        }
    }
}

/// Outcome of [`MultiStore::validate_store`].
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// True if no violation was found.
    pub is_valid: bool,
    /// Every violation, in audit order.
    pub errors: Vec<StoreViolation>,
}

/// Summary counts for a store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of entities.
    pub total: usize,
    /// Entity count per type; types with no entities are omitted.
    pub per_type: BTreeMap<EntityType, usize>,
    /// Number of parentless entities.
    pub roots: usize,
    /// Depth of the deepest entity.
    pub max_depth: usize,
}
