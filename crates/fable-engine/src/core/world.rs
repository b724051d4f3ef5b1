use crate::api::types::{EngineError, EntityId};
use crate::components::entity::Entity;

/// The game-object tree.
///
/// Entities live in a flat arena; parent/child relations are stored as ids,
/// never as pointers. An entity is "live" when it is reachable from the
/// root ("world") entity, which is created here and can never be detached
/// or despawned. Detached entities stay in the arena but are not updated.
pub struct World {
    entities: Vec<Entity>,
    next_id: u32,
    root: EntityId,
}

impl World {
    pub fn new() -> Self {
        let root = EntityId(0);
        let mut entities = Vec::with_capacity(256);
        entities.push(Entity::new(root).with_tag("world"));
        Self {
            entities,
            next_id: 1,
            root,
        }
    }

    /// The root entity id.
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Allocate the next unique entity id.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a detached entity to the arena. Attach it to a live entity to
    /// bring it into the update pass.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|e| e.id == id)
    }

    /// Insert `child` into `parent`'s ordered child set.
    ///
    /// Fails if the child already has a parent, if either entity is
    /// missing, or if the attachment would create a cycle (including any
    /// attempt to give the root a parent).
    pub fn attach(&mut self, parent: EntityId, child: EntityId) -> Result<(), EngineError> {
        if !self.contains(parent) {
            return Err(EngineError::NoSuchEntity(parent));
        }
        let child_entity = self
            .get(child)
            .ok_or(EngineError::NoSuchEntity(child))?;
        if child_entity.parent.is_some() {
            return Err(EngineError::DuplicateAttachment(child));
        }
        if child == self.root || self.is_ancestor(child, parent) {
            return Err(EngineError::CyclicAttachment { parent, child });
        }

        if let Some(parent_entity) = self.get_mut(parent) {
            parent_entity.children.push(child);
        }
        if let Some(child_entity) = self.get_mut(child) {
            child_entity.parent = Some(parent);
        }
        Ok(())
    }

    /// Remove `child` from its parent's child set, leaving it detached.
    pub fn detach(&mut self, child: EntityId) -> Result<(), EngineError> {
        let parent = match self.get(child) {
            Some(entity) => entity.parent.ok_or(EngineError::NotAttached(child))?,
            None => return Err(EngineError::NoSuchEntity(child)),
        };

        if let Some(parent_entity) = self.get_mut(parent) {
            parent_entity.children.retain(|&c| c != child);
        }
        if let Some(child_entity) = self.get_mut(child) {
            child_entity.parent = None;
        }
        Ok(())
    }

    /// Remove an entity and its entire subtree from the arena.
    /// Returns the removed entities so the caller can release any external
    /// resources they hold. The root cannot be despawned.
    pub fn despawn(&mut self, id: EntityId) -> Vec<Entity> {
        if id == self.root {
            log::warn!("refusing to despawn the world root");
            return Vec::new();
        }
        if !self.contains(id) {
            return Vec::new();
        }

        let _ = self.detach(id); // detached entities are fine too

        let mut doomed = Vec::new();
        self.collect_subtree(id, &mut doomed);

        let mut removed = Vec::with_capacity(doomed.len());
        for victim in doomed {
            if let Some(idx) = self.entities.iter().position(|e| e.id == victim) {
                removed.push(self.entities.swap_remove(idx));
            }
        }
        removed
    }

    /// Depth-first search of the subtree rooted at `start` (inclusive),
    /// in child order.
    pub fn find_descendant(
        &self,
        start: EntityId,
        predicate: impl Fn(&Entity) -> bool,
    ) -> Option<EntityId> {
        self.find_descendant_dyn(start, &predicate)
    }

    fn find_descendant_dyn(
        &self,
        start: EntityId,
        predicate: &dyn Fn(&Entity) -> bool,
    ) -> Option<EntityId> {
        let entity = self.get(start)?;
        if predicate(entity) {
            return Some(start);
        }
        for &child in &entity.children {
            if let Some(found) = self.find_descendant_dyn(child, predicate) {
                return Some(found);
            }
        }
        None
    }

    /// Find the first live entity with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<EntityId> {
        self.find_descendant(self.root, |e| e.tag == tag)
    }

    /// Live entity ids in pre-order (parents before children).
    pub fn live_ids(&self) -> Vec<EntityId> {
        let mut ids = Vec::with_capacity(self.entities.len());
        self.collect_subtree(self.root, &mut ids);
        ids
    }

    /// Iterate over every entity in the arena, live or detached.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Number of entities in the arena (including the root).
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn collect_subtree(&self, id: EntityId, out: &mut Vec<EntityId>) {
        if let Some(entity) = self.get(id) {
            out.push(id);
            for &child in &entity.children {
                self.collect_subtree(child, out);
            }
        }
    }

    /// Whether `ancestor` appears on `node`'s parent chain (or is the node).
    fn is_ancestor(&self, ancestor: EntityId, node: EntityId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|e| e.parent);
        }
        false
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
