//! The engine loop.
//!
//! [`Engine`] owns all engine state: the entity tree, the timer, the
//! message bus, the input queue, the render buffer and (with the `physics`
//! feature) the simulation bridge. The host drives it by calling
//! [`Engine::step`] once per animation frame with a wall-clock millisecond
//! reading; the engine never schedules itself.

#[cfg(feature = "physics")]
use glam::Vec2;

use crate::api::types::{EngineError, EntityId, SoundEvent};
use crate::components::entity::Entity;
use crate::components::{Component, ComponentKind};
#[cfg(feature = "physics")]
use crate::components::ReadyState;
use crate::core::message::{Message, MessageBus};
#[cfg(feature = "physics")]
use crate::core::physics::{PhysicsBody, PhysicsWorld};
use crate::core::timer::Timer;
use crate::core::world::World;
use crate::input::queue::InputQueue;
use crate::renderer::instance::RenderBuffer;
use crate::renderer::stage::build_render_buffer;
use crate::renderer::traits::Renderer;

/// Per-entity game logic, run once per frame during the tree update.
///
/// A behavior owns its own state; the entity and the frame context arrive
/// as arguments. Returning an error logs it and skips the rest of this
/// entity's update — siblings and the frame itself are unaffected.
pub trait Behavior {
    fn update(&mut self, entity: &mut Entity, ctx: &mut UpdateContext<'_>)
        -> Result<(), EngineError>;
}

/// Frame context handed to every behavior: everything an entity may touch
/// besides itself. The tree is deliberately absent — cross-entity effects
/// go through the message bus.
pub struct UpdateContext<'a> {
    pub timer: &'a Timer,
    pub bus: &'a mut MessageBus,
    pub input: &'a InputQueue,
    #[cfg(feature = "physics")]
    pub physics: &'a mut PhysicsWorld,
}

/// Engine configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Maximum render instances per frame.
    pub max_instances: usize,
    /// Maximum sound events collected per frame.
    pub max_sounds: usize,
    /// Maximum simulated rigid bodies.
    #[cfg(feature = "physics")]
    pub max_bodies: usize,
    /// Gravity in m/s², Y-down positive.
    #[cfg(feature = "physics")]
    pub gravity: glam::Vec2,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_width: 800.0,
            world_height: 600.0,
            max_instances: RenderBuffer::DEFAULT_MAX_INSTANCES,
            max_sounds: 32,
            #[cfg(feature = "physics")]
            max_bodies: PhysicsWorld::DEFAULT_MAX_BODIES,
            #[cfg(feature = "physics")]
            gravity: glam::Vec2::ZERO,
        }
    }
}

/// The orchestration core. See the module docs for the frame order.
pub struct Engine {
    config: EngineConfig,
    world: World,
    timer: Timer,
    bus: MessageBus,
    input: InputQueue,
    render_buffer: RenderBuffer,
    /// Sound events collected during the most recent step.
    sounds: Vec<SoundEvent>,
    #[cfg(feature = "physics")]
    physics: PhysicsWorld,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            render_buffer: RenderBuffer::with_max_instances(config.max_instances),
            #[cfg(feature = "physics")]
            physics: PhysicsWorld::with_body_budget(config.gravity, config.max_bodies),
            world: World::new(),
            timer: Timer::new(),
            bus: MessageBus::new(),
            input: InputQueue::new(),
            sounds: Vec::new(),
            config,
        }
    }

    /// Advance the engine by one frame.
    ///
    /// Order: tick the timer; translate pending contact events into paired
    /// messages; bind new rigid bodies; step the simulation; deliver
    /// messages; update the tree children-first; rebuild the render buffer;
    /// drain input. Messages published during the update pass are delivered
    /// on the next step.
    pub fn step(&mut self, now_ms: u64) {
        let before = self.timer.now();
        self.timer.tick(now_ms);
        let dt = self.timer.time_since(before) as f32 / 1000.0;
        let now = self.timer.now();

        self.sounds.clear();

        #[cfg(feature = "physics")]
        {
            // Each contact produces two directed messages, one per side.
            for event in self.physics.poll_contact_events() {
                self.bus
                    .publish(Message::contact(event.entity_a, event.entity_b, now, event));
                self.bus
                    .publish(Message::contact(event.entity_b, event.entity_a, now, event));
            }

            self.bind_pending_bodies();
            self.physics.step(self.timer.current_fps());
        }

        self.bus.drain_and_deliver(&mut self.world);

        let root = self.world.root();
        let mut ctx = UpdateContext {
            timer: &self.timer,
            bus: &mut self.bus,
            input: &self.input,
            #[cfg(feature = "physics")]
            physics: &mut self.physics,
        };
        update_entity(
            &mut self.world,
            root,
            &mut ctx,
            &mut self.sounds,
            self.config.max_sounds,
            dt,
            now,
        );

        build_render_buffer(&self.world, &mut self.render_buffer);

        self.input.drain();
    }

    /// Hand the current frame to a render backend.
    pub fn present(&self, renderer: &mut dyn Renderer) {
        renderer.draw(&self.render_buffer);
    }

    // -- Tree --

    /// Add a detached entity to the world with a fresh id.
    pub fn spawn(&mut self, build: impl FnOnce(EntityId) -> Entity) -> EntityId {
        let id = self.world.next_id();
        self.world.spawn(build(id))
    }

    pub fn attach(&mut self, parent: EntityId, child: EntityId) -> Result<(), EngineError> {
        self.world.attach(parent, child)
    }

    pub fn detach(&mut self, child: EntityId) -> Result<(), EngineError> {
        self.world.detach(child)
    }

    /// Remove an entity and its subtree, releasing any bound physics bodies.
    pub fn despawn(&mut self, id: EntityId) {
        let removed = self.world.despawn(id);
        #[cfg(feature = "physics")]
        for entity in &removed {
            if let Some(Component::RigidBody(rb)) = entity.component(ComponentKind::RigidBody) {
                if let Some(handle) = rb.handle {
                    self.physics.remove_body(&handle);
                }
            }
        }
        #[cfg(not(feature = "physics"))]
        let _ = removed;
    }

    // -- Accessors --

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Queue a message for delivery on the next step.
    pub fn publish(&mut self, message: Message) {
        self.bus.publish(message);
    }

    /// Host-side input entry point.
    pub fn input_mut(&mut self) -> &mut InputQueue {
        &mut self.input
    }

    pub fn render_buffer(&self) -> &RenderBuffer {
        &self.render_buffer
    }

    /// Sound events collected during the most recent step.
    pub fn sounds(&self) -> &[SoundEvent] {
        &self.sounds
    }

    #[cfg(feature = "physics")]
    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    #[cfg(feature = "physics")]
    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    // -- Physics conveniences --

    /// Apply an instantaneous impulse to an entity's bound body.
    #[cfg(feature = "physics")]
    pub fn apply_impulse(&mut self, id: EntityId, impulse: Vec2) {
        if let Some(body) = self.bound_body(id) {
            self.physics.apply_impulse(&body, impulse);
        }
    }

    /// Apply a continuous force to an entity's bound body.
    #[cfg(feature = "physics")]
    pub fn apply_force(&mut self, id: EntityId, force: Vec2) {
        if let Some(body) = self.bound_body(id) {
            self.physics.apply_force(&body, force);
        }
    }

    /// Set the linear velocity of an entity's bound body.
    #[cfg(feature = "physics")]
    pub fn set_velocity(&mut self, id: EntityId, velocity: Vec2) {
        if let Some(body) = self.bound_body(id) {
            self.physics.set_velocity(&body, velocity);
        }
    }

    /// Linear velocity of an entity's bound body, or zero.
    #[cfg(feature = "physics")]
    pub fn velocity(&self, id: EntityId) -> Vec2 {
        self.bound_body(id)
            .map(|body| self.physics.velocity(&body))
            .unwrap_or(Vec2::ZERO)
    }

    #[cfg(feature = "physics")]
    fn bound_body(&self, id: EntityId) -> Option<PhysicsBody> {
        match self.world.get(id)?.component(ComponentKind::RigidBody)? {
            Component::RigidBody(rb) => rb.handle,
            _ => None,
        }
    }

    /// Create simulation bodies for live rigid-body components that have
    /// none yet. The body starts where the entity is, converted to meters.
    /// A failed creation marks the component `Failed` and is not retried.
    #[cfg(feature = "physics")]
    fn bind_pending_bodies(&mut self) {
        for id in self.world.live_ids() {
            let Some(entity) = self.world.get_mut(id) else {
                continue;
            };
            let pos = entity.pos;
            let rotation = entity.rotation;
            let Some(Component::RigidBody(rb)) = entity.component_mut(ComponentKind::RigidBody)
            else {
                continue;
            };
            if rb.handle.is_some() || rb.state == ReadyState::Failed {
                continue;
            }

            let ppm = rb.pixels_per_meter;
            let def = rb
                .def
                .clone()
                .with_position(Vec2::new(pos.x / ppm, pos.y / ppm))
                .with_rotation(rotation);

            match self.physics.create_body(id, &def, &rb.material) {
                Ok(handle) => {
                    rb.handle = Some(handle);
                    rb.state = ReadyState::Ready;
                }
                Err(err) => {
                    rb.state = ReadyState::Failed;
                    log::warn!("binding physics body for {:?} failed: {}", id, err);
                }
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Children-first depth-first update of one entity's subtree.
///
/// Per entity: copy the transform back from the bound physics body, run the
/// behavior, tick intrinsic component state, collect triggered sounds,
/// stamp `last_update`, clear the inbox. Inactive entities stop the
/// recursion for their whole subtree.
fn update_entity(
    world: &mut World,
    id: EntityId,
    ctx: &mut UpdateContext<'_>,
    sounds: &mut Vec<SoundEvent>,
    max_sounds: usize,
    dt: f32,
    now: u64,
) {
    let Some(entity) = world.get(id) else {
        return;
    };
    if !entity.active {
        return;
    }

    let children = entity.children().to_vec();
    for child in children {
        update_entity(world, child, ctx, sounds, max_sounds, dt, now);
    }

    let Some(entity) = world.get_mut(id) else {
        return;
    };

    // The simulation owns X/Y and rotation once a body is bound; depth
    // stays with the entity.
    #[cfg(feature = "physics")]
    {
        let bound = match entity.component(ComponentKind::RigidBody) {
            Some(Component::RigidBody(rb)) => rb.handle.map(|h| (h, rb.pixels_per_meter)),
            _ => None,
        };
        if let Some((handle, ppm)) = bound {
            let (pos, rotation) = ctx.physics.body_position(&handle);
            entity.pos.x = pos.x * ppm;
            entity.pos.y = pos.y * ppm;
            entity.rotation = rotation;
        }
    }

    // Take the behavior out so it can borrow the entity it lives on.
    let mut behavior = entity.behavior.take();
    if let Some(b) = behavior.as_mut() {
        if let Err(err) = b.update(entity, ctx) {
            log::warn!("behavior on {:?} failed: {}", id, err);
        }
    }
    if entity.behavior.is_none() {
        entity.behavior = behavior;
    }

    let mut fly_expired = false;
    for component in entity.components_mut().iter_mut() {
        match component {
            Component::FlyText(fly) => {
                fly.tick(dt);
                if fly.expired() {
                    fly_expired = true;
                }
            }
            Component::ParticleEmitter(emitter) => emitter.tick(dt),
            Component::AudioSource(source) => {
                if source.take_trigger() {
                    if sounds.len() < max_sounds {
                        sounds.push(SoundEvent {
                            sound: source.sound,
                            volume: source.volume,
                        });
                    } else {
                        log::debug!("sound budget reached, dropping trigger on {:?}", id);
                    }
                }
            }
            _ => {}
        }
    }
    if fly_expired {
        entity.remove_component(ComponentKind::FlyText);
    }

    entity.last_update = now;
    entity.inbox.clear();
}
