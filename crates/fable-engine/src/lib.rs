//! fable-engine: a headless 2D game-engine core.
//!
//! The engine owns the entity tree, timing, messaging, the physics bridge
//! and the per-frame render instance buffer. It draws nothing and schedules
//! nothing: a host drives it by calling [`Engine::step`] once per animation
//! frame and presents the resulting buffer through a [`Renderer`] backend.

pub mod api;
pub mod components;
pub mod core;
pub mod input;
pub mod renderer;

// Re-export key types at crate root for convenience
pub use api::engine::{Behavior, Engine, EngineConfig, UpdateContext};
pub use api::types::{EngineError, EntityId, SoundEvent, SoundId};
pub use components::audio::AudioSourceComponent;
pub use components::emitter::{EmitterComponent, Particle};
pub use components::entity::Entity;
pub use components::sprite::{AtlasId, BlendMode, SpriteComponent};
pub use components::text::{FlyTextComponent, FontConfig, TextComponent};
pub use components::tilemap::{Tile, TilemapComponent};
pub use components::{
    BaseComponent, Component, ComponentKind, ComponentSet, CustomComponent, ReadyState,
};
pub use core::message::{Message, MessageBus, MessageKind, MessagePayload};
pub use core::timer::{Timer, CYCLE_CEILING};
pub use core::world::World;
pub use input::queue::{InputEvent, InputQueue};
pub use renderer::instance::{RenderBuffer, RenderInstance};
pub use renderer::stage::build_render_buffer;
pub use renderer::traits::Renderer;

#[cfg(feature = "physics")]
pub use components::body::RigidBodyComponent;
#[cfg(feature = "physics")]
pub use core::physics::{
    BodyDef, BodyType, ContactEvent, MaterialDef, PhysicsBody, PhysicsWorld, ShapeDesc,
};
