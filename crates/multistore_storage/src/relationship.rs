//! Parent-child relationship index.
//!
//! The index tracks hierarchy edges and per-type membership independently of
//! the entity table, so hierarchy queries run in O(children) or O(depth)
//! without touching entity data. It never validates: callers check an edge
//! with the validation engine before recording it here.

use std::collections::{HashMap, HashSet, VecDeque};

use multistore_foundation::{Entity, EntityId, EntityType};

use crate::config::DEFAULT_MAX_ANCESTOR_DEPTH;

/// Maintains hierarchy and type indices for registered entities.
///
/// - Children: parent -> children, in insertion order
/// - Parent: child -> parent
/// - Type membership: type -> ids, in insertion order
/// - Active slot: type -> selected id
#[derive(Clone, Debug)]
pub struct RelationshipIndex {
    /// Forward index: parent -> ordered children. Empty sets are dropped.
    children_of: HashMap<EntityId, Vec<EntityId>>,
    /// Reverse index: child -> parent.
    parent_of: HashMap<EntityId, EntityId>,
    /// Type membership, insertion ordered.
    ids_of_type: HashMap<EntityType, Vec<EntityId>>,
    /// At most one selected id per type.
    active_of: HashMap<EntityType, EntityId>,
    /// Type of every registered id.
    type_of: HashMap<EntityId, EntityType>,
    /// Circuit breaker for ancestor walks.
    max_ancestor_depth: usize,
}

impl Default for RelationshipIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipIndex {
    /// Creates an empty index with the default ancestor walk bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_ANCESTOR_DEPTH)
    }

    /// Creates an empty index whose ancestor walks stop after `max_depth` hops.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            children_of: HashMap::new(),
            parent_of: HashMap::new(),
            ids_of_type: HashMap::new(),
            active_of: HashMap::new(),
            type_of: HashMap::new(),
            max_ancestor_depth: max_depth,
        }
    }

    /// Records an entity and its parent edge.
    ///
    /// Registering an id that is already present first drops its old entries,
    /// so the id never appears twice in any set.
    pub fn register(&mut self, entity: &Entity) {
        if self.type_of.contains_key(&entity.id) {
            self.unregister(&entity.id);
        }

        let ty = entity.entity_type();
        self.type_of.insert(entity.id.clone(), ty);
        self.ids_of_type
            .entry(ty)
            .or_default()
            .push(entity.id.clone());

        if let Some(parent) = &entity.parent_id {
            self.link(&entity.id, parent);
        }
    }

    /// Forgets an entity.
    ///
    /// Removes it from its type set, its parent's children and the active
    /// slot. Its own children are left alone: cascading is the caller's job.
    /// Returns false if the id was not registered.
    pub fn unregister(&mut self, id: &EntityId) -> bool {
        self.unregister_all(std::slice::from_ref(id)) == 1
    }

    /// Forgets a set of entities at once.
    ///
    /// Same effect as [`unregister`](Self::unregister) on each id, but every
    /// type list and child list the set touches is filtered a single time, so
    /// dropping a whole subtree stays linear. Children outside the set keep
    /// their parent entry. Returns how many of the ids were registered.
    pub fn unregister_all(&mut self, ids: &[EntityId]) -> usize {
        let doomed: HashSet<&EntityId> = ids
            .iter()
            .filter(|id| self.type_of.contains_key(*id))
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        let mut types = HashSet::new();
        let mut parents = HashSet::new();
        for id in &doomed {
            if let Some(ty) = self.type_of.remove(*id) {
                types.insert(ty);
            }
            if let Some(parent) = self.parent_of.remove(*id) {
                parents.insert(parent);
            }
        }

        for ty in types {
            if let Some(list) = self.ids_of_type.get_mut(&ty) {
                list.retain(|other| !doomed.contains(other));
                if list.is_empty() {
                    self.ids_of_type.remove(&ty);
                }
            }
        }
        for parent in parents {
            if let Some(children) = self.children_of.get_mut(&parent) {
                children.retain(|child| !doomed.contains(child));
                if children.is_empty() {
                    self.children_of.remove(&parent);
                }
            }
        }
        self.active_of.retain(|_, active| !doomed.contains(active));

        doomed.len()
    }

    /// Moves an entity under a new parent, or detaches it with `None`.
    pub fn update_parent(&mut self, id: &EntityId, new_parent: Option<&EntityId>) {
        self.unlink(id);
        if let Some(parent) = new_parent {
            self.link(id, parent);
        }
    }

    fn link(&mut self, child: &EntityId, parent: &EntityId) {
        self.parent_of.insert(child.clone(), parent.clone());
        let children = self.children_of.entry(parent.clone()).or_default();
        if !children.contains(child) {
            children.push(child.clone());
        }
    }

    fn unlink(&mut self, child: &EntityId) {
        if let Some(parent) = self.parent_of.remove(child) {
            if let Some(children) = self.children_of.get_mut(&parent) {
                children.retain(|c| c != child);
                if children.is_empty() {
                    self.children_of.remove(&parent);
                }
            }
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.children_of.clear();
        self.parent_of.clear();
        self.ids_of_type.clear();
        self.active_of.clear();
        self.type_of.clear();
    }

    /// Returns true if the id is registered.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.type_of.contains_key(id)
    }

    /// Returns the number of registered ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.type_of.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_of.is_empty()
    }

    /// Returns the type of a registered id.
    #[must_use]
    pub fn entity_type(&self, id: &EntityId) -> Option<EntityType> {
        self.type_of.get(id).copied()
    }

    /// Returns the registered ids of a type, in insertion order.
    #[must_use]
    pub fn ids_of_type(&self, ty: EntityType) -> &[EntityId] {
        self.ids_of_type.get(&ty).map_or(&[], Vec::as_slice)
    }

    /// Iterates every registered id: types in registry order, ids in
    /// insertion order within a type.
    pub fn ids(&self) -> impl Iterator<Item = &EntityId> + '_ {
        EntityType::ALL
            .iter()
            .flat_map(move |ty| self.ids_of_type(*ty).iter())
    }

    /// Returns the registered ids without a parent, in [`ids`](Self::ids) order.
    #[must_use]
    pub fn roots(&self) -> Vec<EntityId> {
        self.ids()
            .filter(|id| !self.parent_of.contains_key(*id))
            .cloned()
            .collect()
    }

    // --- Hierarchy queries ---

    /// Returns the parent of an entity.
    #[must_use]
    pub fn parent(&self, id: &EntityId) -> Option<&EntityId> {
        self.parent_of.get(id)
    }

    /// Returns the direct children of an entity, in insertion order.
    #[must_use]
    pub fn children(&self, id: &EntityId) -> &[EntityId] {
        self.children_of.get(id).map_or(&[], Vec::as_slice)
    }

    /// Returns true if the entity has at least one child.
    #[must_use]
    pub fn has_children(&self, id: &EntityId) -> bool {
        !self.children(id).is_empty()
    }

    /// Returns the other children of the entity's parent.
    ///
    /// Parentless entities have no siblings.
    #[must_use]
    pub fn siblings(&self, id: &EntityId) -> Vec<EntityId> {
        self.parent(id)
            .map(|parent| {
                self.children(parent)
                    .iter()
                    .filter(|c| *c != id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the ancestors of an entity, nearest first.
    ///
    /// The walk stops after the configured number of hops, or when it meets
    /// a node twice, logging a warning instead of failing.
    #[must_use]
    pub fn ancestors(&self, id: &EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(id);

        let mut current = id;
        while let Some(parent) = self.parent_of.get(current) {
            if result.len() >= self.max_ancestor_depth {
                tracing::warn!(
                    entity = %id,
                    max_depth = self.max_ancestor_depth,
                    "ancestor walk exceeded depth limit; stopping"
                );
                break;
            }
            if !seen.insert(parent) {
                tracing::warn!(entity = %id, at = %parent, "cycle in parent chain; stopping");
                break;
            }
            result.push(parent.clone());
            current = parent;
        }

        result
    }

    /// Returns all descendants of an entity in breadth-first order.
    ///
    /// The entity itself is never included.
    #[must_use]
    pub fn descendants(&self, id: &EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        let mut visited: HashSet<&EntityId> = HashSet::new();
        visited.insert(id);

        let mut queue: VecDeque<&EntityId> = VecDeque::new();
        queue.push_back(id);

        while let Some(current) = queue.pop_front() {
            for child in self.children(current) {
                if visited.insert(child) {
                    result.push(child.clone());
                    queue.push_back(child);
                } else {
                    tracing::warn!(entity = %id, at = %child, "revisited node during descent");
                }
            }
        }

        result
    }

    /// Returns the ids from the root down to and including the entity.
    #[must_use]
    pub fn path(&self, id: &EntityId) -> Vec<EntityId> {
        let mut path = self.ancestors(id);
        path.reverse();
        path.push(id.clone());
        path
    }

    /// Returns the number of ancestors; roots have depth 0.
    #[must_use]
    pub fn depth(&self, id: &EntityId) -> usize {
        self.ancestors(id).len()
    }

    /// Returns true if `ancestor` lies on the parent chain of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &EntityId, id: &EntityId) -> bool {
        self.ancestors(id).iter().any(|a| a == ancestor)
    }

    /// Returns true if `id` lies below `ancestor`.
    #[must_use]
    pub fn is_descendant(&self, id: &EntityId, ancestor: &EntityId) -> bool {
        self.is_ancestor(ancestor, id)
    }

    /// Returns true if placing `id` under `new_parent` would close a loop.
    #[must_use]
    pub fn would_create_cycle(&self, id: &EntityId, new_parent: &EntityId) -> bool {
        id == new_parent || self.is_ancestor(id, new_parent)
    }

    /// Returns true if `id` may be moved under `new_parent`.
    ///
    /// Checks registration, the compatibility table, and acyclicity. `None`
    /// is accepted only for types that need no parent.
    #[must_use]
    pub fn can_set_parent(&self, id: &EntityId, new_parent: Option<&EntityId>) -> bool {
        let Some(child_type) = self.entity_type(id) else {
            return false;
        };
        match new_parent {
            None => !child_type.requires_parent(),
            Some(parent) => match self.entity_type(parent) {
                Some(parent_type) => {
                    child_type.requires_parent()
                        && parent_type.can_contain(child_type)
                        && !self.would_create_cycle(id, parent)
                }
                None => false,
            },
        }
    }

    // --- Active slots ---

    /// Selects an entity as the active one of its type.
    ///
    /// Returns false, leaving the slot untouched, if the id is not registered.
    pub fn set_active(&mut self, id: &EntityId) -> bool {
        match self.entity_type(id) {
            Some(ty) => {
                self.active_of.insert(ty, id.clone());
                true
            }
            None => false,
        }
    }

    /// Returns the active id of a type.
    #[must_use]
    pub fn active(&self, ty: EntityType) -> Option<&EntityId> {
        self.active_of.get(&ty)
    }

    /// Clears the active slot of a type, returning the id it held.
    pub fn clear_active(&mut self, ty: EntityType) -> Option<EntityId> {
        self.active_of.remove(&ty)
    }

    /// Returns every occupied active slot, in registry order.
    #[must_use]
    pub fn active_slots(&self) -> Vec<(EntityType, EntityId)> {
        EntityType::ALL
            .iter()
            .filter_map(|ty| self.active_of.get(ty).map(|id| (*ty, id.clone())))
            .collect()
    }

    /// Returns true if any index map mentions the id, as key or value.
    #[must_use]
    pub fn mentions(&self, id: &EntityId) -> bool {
        self.type_of.contains_key(id)
            || self.parent_of.contains_key(id)
            || self.children_of.contains_key(id)
            || self.parent_of.values().any(|p| p == id)
            || self.children_of.values().any(|c| c.contains(id))
            || self.ids_of_type.values().any(|ids| ids.contains(id))
            || self.active_of.values().any(|a| a == id)
    }
}
