pub mod audio;
#[cfg(feature = "physics")]
pub mod body;
pub mod emitter;
pub mod entity;
pub mod sprite;
pub mod text;
pub mod tilemap;

use serde_json::Value;

use crate::components::audio::AudioSourceComponent;
#[cfg(feature = "physics")]
use crate::components::body::RigidBodyComponent;
use crate::components::emitter::EmitterComponent;
use crate::components::sprite::SpriteComponent;
use crate::components::text::{FlyTextComponent, TextComponent};
use crate::components::tilemap::TilemapComponent;

/// Component kind tag. At most one component of each kind per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Base,
    RigidBody,
    Sprite,
    Text,
    FlyText,
    AudioSource,
    ParticleEmitter,
    Tilemap,
    Custom,
}

/// Resource readiness of a component.
///
/// `Initializing → Buffering → Ready`, with `Failed` reachable from either
/// non-terminal state. Only `Ready` components participate in rendering;
/// `Failed` components stay attached so diagnostics can inspect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ReadyState {
    #[default]
    Initializing,
    Buffering,
    Ready,
    Failed,
}

impl ReadyState {
    /// Whether the state machine permits moving from `self` to `to`.
    pub fn can_transition(self, to: ReadyState) -> bool {
        use ReadyState::*;
        matches!(
            (self, to),
            (Initializing, Buffering)
                | (Buffering, Ready)
                | (Initializing, Failed)
                | (Buffering, Failed)
        )
    }
}

/// Marker component with no kind-specific state.
#[derive(Debug, Clone, Default)]
pub struct BaseComponent {
    pub state: ReadyState,
}

/// Game-defined component: a name, a renderable flag and opaque data.
#[derive(Debug, Clone)]
pub struct CustomComponent {
    pub name: String,
    pub renderable: bool,
    pub state: ReadyState,
    pub data: Value,
}

impl CustomComponent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            renderable: false,
            state: ReadyState::Ready,
            data: Value::Null,
        }
    }

    pub fn with_renderable(mut self, renderable: bool) -> Self {
        self.renderable = renderable;
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Closed variant over all component kinds.
///
/// Behavior lives in the engine's update pass; these carry the data.
#[derive(Debug, Clone)]
pub enum Component {
    Base(BaseComponent),
    #[cfg(feature = "physics")]
    RigidBody(RigidBodyComponent),
    Sprite(SpriteComponent),
    Text(TextComponent),
    FlyText(FlyTextComponent),
    AudioSource(AudioSourceComponent),
    ParticleEmitter(EmitterComponent),
    Tilemap(TilemapComponent),
    Custom(CustomComponent),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Base(_) => ComponentKind::Base,
            #[cfg(feature = "physics")]
            Component::RigidBody(_) => ComponentKind::RigidBody,
            Component::Sprite(_) => ComponentKind::Sprite,
            Component::Text(_) => ComponentKind::Text,
            Component::FlyText(_) => ComponentKind::FlyText,
            Component::AudioSource(_) => ComponentKind::AudioSource,
            Component::ParticleEmitter(_) => ComponentKind::ParticleEmitter,
            Component::Tilemap(_) => ComponentKind::Tilemap,
            Component::Custom(_) => ComponentKind::Custom,
        }
    }

    /// Whether this component produces render output.
    pub fn is_renderable(&self) -> bool {
        match self {
            Component::Sprite(_)
            | Component::Text(_)
            | Component::FlyText(_)
            | Component::ParticleEmitter(_)
            | Component::Tilemap(_) => true,
            Component::Custom(c) => c.renderable,
            _ => false,
        }
    }

    pub fn state(&self) -> ReadyState {
        match self {
            Component::Base(c) => c.state,
            #[cfg(feature = "physics")]
            Component::RigidBody(c) => c.state,
            Component::Sprite(c) => c.state,
            Component::Text(c) => c.state,
            Component::FlyText(c) => c.state,
            Component::AudioSource(c) => c.state,
            Component::ParticleEmitter(c) => c.state,
            Component::Tilemap(c) => c.state,
            Component::Custom(c) => c.state,
        }
    }

    /// Attempt a readiness transition. Invalid transitions are rejected and
    /// logged; the state is left unchanged.
    pub fn set_state(&mut self, to: ReadyState) -> bool {
        let current = self.state();
        if !current.can_transition(to) {
            log::warn!(
                "invalid readiness transition {:?} -> {:?} on {:?} component",
                current,
                to,
                self.kind()
            );
            return false;
        }
        *self.state_mut() = to;
        true
    }

    fn state_mut(&mut self) -> &mut ReadyState {
        match self {
            Component::Base(c) => &mut c.state,
            #[cfg(feature = "physics")]
            Component::RigidBody(c) => &mut c.state,
            Component::Sprite(c) => &mut c.state,
            Component::Text(c) => &mut c.state,
            Component::FlyText(c) => &mut c.state,
            Component::AudioSource(c) => &mut c.state,
            Component::ParticleEmitter(c) => &mut c.state,
            Component::Tilemap(c) => &mut c.state,
            Component::Custom(c) => &mut c.state,
        }
    }
}

/// Per-entity component storage: one slot per kind, insertion ordered.
#[derive(Debug, Clone, Default)]
pub struct ComponentSet {
    items: Vec<Component>,
}

impl ComponentSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a component, replacing any existing component of the same kind.
    /// Last write wins; the original insertion slot is kept.
    pub fn add(&mut self, component: Component) {
        let kind = component.kind();
        match self.items.iter_mut().find(|c| c.kind() == kind) {
            Some(slot) => *slot = component,
            None => self.items.push(component),
        }
    }

    pub fn get(&self, kind: ComponentKind) -> Option<&Component> {
        self.items.iter().find(|c| c.kind() == kind)
    }

    pub fn get_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.items.iter_mut().find(|c| c.kind() == kind)
    }

    /// Remove and return the component of the given kind, if present.
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        let idx = self.items.iter().position(|c| c.kind() == kind)?;
        Some(self.items.remove(idx))
    }

    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.items.iter().any(|c| c.kind() == kind)
    }

    /// Renderable components in insertion order. `Failed` components are
    /// excluded but remain attached.
    pub fn renderables(&self) -> impl Iterator<Item = &Component> {
        self.items
            .iter()
            .filter(|c| c.is_renderable() && c.state() != ReadyState::Failed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(mut c: Component) -> Component {
        c.set_state(ReadyState::Buffering);
        c.set_state(ReadyState::Ready);
        c
    }

    #[test]
    fn one_component_per_kind() {
        let mut set = ComponentSet::new();
        set.add(Component::Sprite(SpriteComponent::default()));
        set.add(Component::Sprite(SpriteComponent {
            col: 3.0,
            ..Default::default()
        }));
        assert_eq!(set.len(), 1);
        match set.get(ComponentKind::Sprite).unwrap() {
            Component::Sprite(s) => assert_eq!(s.col, 3.0),
            other => panic!("expected sprite, got {:?}", other.kind()),
        }
    }

    #[test]
    fn replacement_keeps_insertion_slot() {
        let mut set = ComponentSet::new();
        set.add(Component::Sprite(SpriteComponent::default()));
        set.add(Component::Text(TextComponent::new("hi")));
        // Replacing the sprite must not move it behind the text.
        set.add(Component::Sprite(SpriteComponent {
            col: 7.0,
            ..Default::default()
        }));
        let kinds: Vec<_> = set.iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![ComponentKind::Sprite, ComponentKind::Text]);
    }

    #[test]
    fn renderables_in_insertion_order() {
        let mut set = ComponentSet::new();
        set.add(Component::AudioSource(AudioSourceComponent::new(
            crate::api::types::SoundId(1),
        )));
        set.add(ready(Component::Sprite(SpriteComponent::default())));
        set.add(ready(Component::Text(TextComponent::new("hp"))));
        let kinds: Vec<_> = set.renderables().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![ComponentKind::Sprite, ComponentKind::Text]);
    }

    #[test]
    fn failed_components_excluded_but_attached() {
        let mut set = ComponentSet::new();
        let mut sprite = Component::Sprite(SpriteComponent::default());
        sprite.set_state(ReadyState::Failed);
        set.add(sprite);
        assert_eq!(set.renderables().count(), 0);
        assert!(set.contains(ComponentKind::Sprite));
    }

    #[test]
    fn ready_state_transitions() {
        use ReadyState::*;
        assert!(Initializing.can_transition(Buffering));
        assert!(Buffering.can_transition(Ready));
        assert!(Initializing.can_transition(Failed));
        assert!(Buffering.can_transition(Failed));
        // Invalid moves.
        assert!(!Initializing.can_transition(Ready));
        assert!(!Ready.can_transition(Failed));
        assert!(!Failed.can_transition(Initializing));
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let mut sprite = Component::Sprite(SpriteComponent::default());
        assert!(!sprite.set_state(ReadyState::Ready));
        assert_eq!(sprite.state(), ReadyState::Initializing);
    }

    #[test]
    fn remove_component() {
        let mut set = ComponentSet::new();
        set.add(Component::Base(BaseComponent::default()));
        assert!(set.contains(ComponentKind::Base));
        let removed = set.remove(ComponentKind::Base);
        assert!(removed.is_some());
        assert!(!set.contains(ComponentKind::Base));
        assert!(set.remove(ComponentKind::Base).is_none());
    }
}
