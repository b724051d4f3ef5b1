use std::fmt;

use glam::{Vec2, Vec3};

use crate::api::engine::Behavior;
use crate::api::types::EntityId;
use crate::components::{Component, ComponentKind, ComponentSet};
use crate::core::message::Message;

/// A node in the game-object tree: transform, component slots, children.
///
/// Entities are created standalone and become live once attached (directly
/// or transitively) to the world root. The rotation angle in radians is the
/// authoritative orientation; the heading vector is always derived from it,
/// never stored.
pub struct Entity {
    pub id: EntityId,
    /// Human-readable id for lookups; not required to be unique.
    pub tag: String,
    /// Inactive entities are skipped by the update pass, subtree included.
    pub active: bool,
    /// Invisible entities are skipped by the render bridge only.
    pub visible: bool,
    /// Position in world space. Z is draw depth; physics only touches X/Y.
    pub pos: Vec3,
    /// Rotation around Z in radians.
    pub rotation: f32,
    pub scale: Vec3,
    /// Engine time (ms) of the most recent update pass over this entity.
    pub last_update: u64,
    /// Messages delivered this frame; cleared after the entity updates.
    pub inbox: Vec<Message>,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    components: ComponentSet,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl Entity {
    /// Create a detached entity with the given id at the origin.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            active: true,
            visible: true,
            pos: Vec3::ZERO,
            rotation: 0.0,
            scale: Vec3::ONE,
            last_update: 0,
            inbox: Vec::new(),
            parent: None,
            children: Vec::new(),
            components: ComponentSet::new(),
            behavior: None,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_pos(mut self, pos: Vec3) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.add(component);
        self
    }

    pub fn with_behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    // -- Components --

    /// Add a component, replacing any existing one of the same kind.
    pub fn add_component(&mut self, component: Component) {
        self.components.add(component);
    }

    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.get(kind)
    }

    pub fn component_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.components.get_mut(kind)
    }

    pub fn remove_component(&mut self, kind: ComponentKind) -> Option<Component> {
        self.components.remove(kind)
    }

    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.components.contains(kind)
    }

    pub fn components(&self) -> &ComponentSet {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentSet {
        &mut self.components
    }

    // -- Tree --

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Ordered child list.
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    // -- Orientation helpers --

    /// Unit direction vector derived from the rotation angle.
    pub fn heading(&self) -> Vec2 {
        Vec2::new(self.rotation.cos(), self.rotation.sin())
    }

    /// Angle (radians) from this entity's position toward a target.
    pub fn angle_to(&self, target: Vec3) -> f32 {
        (target.y - self.pos.y).atan2(target.x - self.pos.x)
    }

    /// Point the rotation toward a target position.
    pub fn look_at(&mut self, target: Vec3) {
        self.rotation = self.angle_to(target);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("active", &self.active)
            .field("visible", &self.visible)
            .field("pos", &self.pos)
            .field("rotation", &self.rotation)
            .field("scale", &self.scale)
            .field("children", &self.children)
            .field("components", &self.components.len())
            .field("behavior", &self.behavior.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_derives_from_rotation() {
        let e = Entity::new(EntityId(1)).with_rotation(std::f32::consts::FRAC_PI_2);
        let h = e.heading();
        assert!(h.x.abs() < 0.001);
        assert!((h.y - 1.0).abs() < 0.001);
    }

    #[test]
    fn look_at_sets_rotation() {
        let mut e = Entity::new(EntityId(1)).with_pos(Vec3::new(10.0, 10.0, 0.0));
        e.look_at(Vec3::new(20.0, 10.0, 0.0));
        assert!(e.rotation.abs() < 0.001);

        e.look_at(Vec3::new(10.0, 20.0, 0.0));
        assert!((e.rotation - std::f32::consts::FRAC_PI_2).abs() < 0.001);

        // Heading round-trips through the derived vector.
        let h = e.heading();
        assert!((h.y - 1.0).abs() < 0.001);
    }

    #[test]
    fn builder_defaults() {
        let e = Entity::new(EntityId(7)).with_tag("hero");
        assert_eq!(e.tag, "hero");
        assert!(e.active);
        assert!(e.visible);
        assert_eq!(e.scale, Vec3::ONE);
        assert!(e.parent().is_none());
        assert!(e.children().is_empty());
    }
}
