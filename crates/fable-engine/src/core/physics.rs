use glam::Vec2;
use rapier2d::prelude::*;
use std::sync::Mutex;

use crate::api::types::{EngineError, EntityId};

// ---------------------------------------------------------------------------
// Conversion helpers (private) — glam ↔ nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    /// Unaffected by forces and collisions; cannot be moved.
    #[default]
    Static,
    /// Unaffected by forces but movable by setting its next position.
    Kinematic,
    /// Fully simulated: affected by gravity, forces and collisions.
    Dynamic,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Static => RigidBodyType::Fixed,
            BodyType::Kinematic => RigidBodyType::KinematicPositionBased,
            BodyType::Dynamic => RigidBodyType::Dynamic,
        }
    }
}

/// Collider shape, in simulation units (meters).
#[derive(Debug, Clone, Copy)]
pub enum ShapeDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
    CapsuleY { half_height: f32, radius: f32 },
}

impl ShapeDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ShapeDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ShapeDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
            ShapeDesc::CapsuleY { half_height, radius } => {
                ColliderBuilder::capsule_y(half_height, radius)
            }
        }
    }
}

/// Rigid body definition, consumed when the body is created.
#[derive(Debug, Clone)]
pub struct BodyDef {
    pub body_type: BodyType,
    /// Position in simulation units (meters).
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Initial linear velocity.
    pub velocity: Vec2,
    /// Lock rotation entirely (e.g., for characters that must stay upright).
    pub fixed_rotation: bool,
    /// Continuous collision detection for fast bodies. Expensive.
    pub bullet: bool,
}

impl BodyDef {
    /// Create a dynamic body definition.
    pub fn dynamic() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            fixed_rotation: false,
            bullet: false,
        }
    }

    /// Create a static body definition.
    pub fn fixed() -> Self {
        Self {
            body_type: BodyType::Static,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            fixed_rotation: true,
            bullet: false,
        }
    }

    /// Create a kinematic body definition.
    pub fn kinematic() -> Self {
        Self {
            body_type: BodyType::Kinematic,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            fixed_rotation: false,
            bullet: false,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_bullet(mut self, bullet: bool) -> Self {
        self.bullet = bullet;
        self
    }
}

/// Fixture material: shape plus the surface properties of the collider.
#[derive(Debug, Clone, Copy)]
pub struct MaterialDef {
    pub shape: ShapeDesc,
    /// Density in kg/m².
    pub density: f32,
    /// Usually in [0, 1].
    pub friction: f32,
    /// Bounciness, usually in [0, 1].
    pub restitution: f32,
    /// Sensors report contacts but are never resolved against.
    pub sensor: bool,
}

impl MaterialDef {
    pub fn new(shape: ShapeDesc) -> Self {
        Self {
            shape,
            density: 1.0,
            friction: 0.5,
            restitution: 0.3,
            sensor: false,
        }
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }
}

/// Handle pair referencing the simulation internals. Opaque to callers;
/// resolved only through [`PhysicsWorld`]. No two entities may share one.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub(crate) body_handle: RigidBodyHandle,
    pub(crate) collider_handle: ColliderHandle,
}

/// A contact-begin or contact-end notification between two entities,
/// already resolved from collider user-data back to entity ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// `true` when the contact just began, `false` when it ended.
    pub started: bool,
}

// ---------------------------------------------------------------------------
// WASM-safe event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct ContactCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl ContactCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) -> Vec<CollisionEvent> {
        std::mem::take(&mut *self.collisions.lock().unwrap())
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions.lock().unwrap().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
        // Contact forces are not surfaced; the trait requires this.
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Bridge to the external rigid-body simulation.
///
/// Owns all simulation state; entities refer to bodies only through the
/// opaque [`PhysicsBody`] handle. Contact events are accumulated during
/// [`step`](Self::step) and handed out exactly once by
/// [`poll_contact_events`](Self::poll_contact_events).
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    /// Bodies allowed before `create_body` starts failing.
    max_bodies: usize,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    collector: ContactCollector,
    /// Events accumulated since the last poll.
    pending: Vec<ContactEvent>,
}

impl PhysicsWorld {
    pub const DEFAULT_MAX_BODIES: usize = 4096;

    /// Create a simulation with the given gravity (m/s², Y-down positive).
    pub fn new(gravity: Vec2) -> Self {
        Self::with_body_budget(gravity, Self::DEFAULT_MAX_BODIES)
    }

    /// Create a simulation with an explicit body budget.
    pub fn with_body_budget(gravity: Vec2, max_bodies: usize) -> Self {
        Self {
            gravity: vec2_to_na(gravity),
            max_bodies,
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            collector: ContactCollector::new(),
            pending: Vec::new(),
        }
    }

    /// Create a rigid body and its fixture from the given definitions.
    /// The EntityId travels as `user_data` so contact events can be resolved
    /// back to entities.
    ///
    /// Fails with [`EngineError::BodyBudgetExhausted`] when the body budget
    /// is reached; the caller may retry with different parameters or fall
    /// back to no physics binding.
    pub fn create_body(
        &mut self,
        entity: EntityId,
        def: &BodyDef,
        material: &MaterialDef,
    ) -> Result<PhysicsBody, EngineError> {
        if self.bodies.len() >= self.max_bodies {
            return Err(EngineError::BodyBudgetExhausted(self.max_bodies));
        }

        let rb = RigidBodyBuilder::new(def.body_type.to_rapier())
            .translation(vec2_to_na(def.position))
            .rotation(def.rotation)
            .linvel(vec2_to_na(def.velocity))
            .locked_axes(if def.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .ccd_enabled(def.bullet)
            .user_data(entity.0 as u128)
            .build();

        let body_handle = self.bodies.insert(rb);

        let collider = material
            .shape
            .build_collider()
            .density(material.density)
            .friction(material.friction)
            .restitution(material.restitution)
            .sensor(material.sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        Ok(PhysicsBody {
            body_handle,
            collider_handle,
        })
    }

    /// Remove a body and its colliders from the simulation.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Advance the simulation by one frame at the given frame rate.
    /// Contact events are accumulated for the next poll.
    pub fn step(&mut self, fps: u32) {
        self.integration_parameters.dt = 1.0 / fps.max(1) as f32;

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.collector,
        );

        for event in self.collector.drain() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            match (self.collider_to_entity(h1), self.collider_to_entity(h2)) {
                (Some(entity_a), Some(entity_b)) => {
                    self.pending.push(ContactEvent {
                        entity_a,
                        entity_b,
                        started,
                    });
                }
                _ => {
                    // Stale user-data: a body was removed between the
                    // contact and this resolution. Skip, never fail.
                    log::debug!("skipping contact event with unresolvable collider");
                }
            }
        }
    }

    /// Take all contact events accumulated since the last poll.
    /// Each event is returned exactly once.
    pub fn poll_contact_events(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Current position (meters) and rotation (radians) of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> (Vec2, f32) {
        self.bodies
            .get(body.body_handle)
            .map(|rb| {
                let iso = rb.position();
                (
                    Vec2::new(iso.translation.x, iso.translation.y),
                    iso.rotation.angle(),
                )
            })
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    /// Apply a continuous force to a body (call every frame).
    pub fn apply_force(&mut self, body: &PhysicsBody, force: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.add_force(vec2_to_na(force), true);
        }
    }

    /// Apply an instantaneous impulse to a body.
    pub fn apply_impulse(&mut self, body: &PhysicsBody, impulse: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.apply_impulse(vec2_to_na(impulse), true);
        }
    }

    /// Set the linear velocity of a body directly.
    pub fn set_velocity(&mut self, body: &PhysicsBody, velocity: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(vec2_to_na(velocity), true);
        }
    }

    /// Current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    /// Move a kinematic body to a new pose for the next step.
    pub fn set_kinematic_position(&mut self, body: &PhysicsBody, position: Vec2, rotation: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_next_kinematic_position(nalgebra::Isometry2::new(
                vec2_to_na(position),
                rotation,
            ));
        }
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        Some(EntityId(body.user_data as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(radius: f32) -> MaterialDef {
        MaterialDef::new(ShapeDesc::Ball { radius })
    }

    #[test]
    fn create_and_remove_body() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world
            .create_body(EntityId(1), &BodyDef::dynamic(), &ball(0.5))
            .unwrap();
        assert_eq!(world.body_count(), 1);
        world.remove_body(&body);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn body_budget_is_enforced() {
        let mut world = PhysicsWorld::with_body_budget(Vec2::ZERO, 2);
        world
            .create_body(EntityId(1), &BodyDef::dynamic(), &ball(0.5))
            .unwrap();
        world
            .create_body(EntityId(2), &BodyDef::dynamic(), &ball(0.5))
            .unwrap();
        let err = world
            .create_body(EntityId(3), &BodyDef::dynamic(), &ball(0.5))
            .unwrap_err();
        assert!(matches!(err, EngineError::BodyBudgetExhausted(2)));
        assert_eq!(world.body_count(), 2);
    }

    #[test]
    fn gravity_affects_dynamic_body() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 10.0));
        let body = world
            .create_body(EntityId(1), &BodyDef::dynamic(), &ball(0.5))
            .unwrap();

        let (initial, _) = world.body_position(&body);
        for _ in 0..10 {
            world.step(60);
        }
        let (current, _) = world.body_position(&body);
        assert!(
            current.y > initial.y,
            "body should fall: start={}, end={}",
            initial.y,
            current.y
        );
    }

    #[test]
    fn static_body_does_not_move() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 10.0));
        let body = world
            .create_body(
                EntityId(1),
                &BodyDef::fixed().with_position(Vec2::new(0.0, 5.0)),
                &MaterialDef::new(ShapeDesc::Cuboid {
                    half_width: 10.0,
                    half_height: 0.5,
                }),
            )
            .unwrap();

        for _ in 0..10 {
            world.step(60);
        }
        let (pos, _) = world.body_position(&body);
        assert!((pos.y - 5.0).abs() < 0.001, "static body moved: y={}", pos.y);
    }

    #[test]
    fn impulse_changes_velocity() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world
            .create_body(EntityId(1), &BodyDef::dynamic(), &ball(0.5))
            .unwrap();

        assert_eq!(world.velocity(&body), Vec2::ZERO);
        world.apply_impulse(&body, Vec2::new(10.0, 0.0));
        world.step(60);
        let vel = world.velocity(&body);
        assert!(vel.x > 0.0, "velocity should be positive X: {:?}", vel);
    }

    #[test]
    fn contact_events_between_converging_bodies() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);

        world
            .create_body(
                EntityId(1),
                &BodyDef::dynamic()
                    .with_position(Vec2::new(0.0, 0.0))
                    .with_velocity(Vec2::new(4.0, 0.0)),
                &ball(0.5),
            )
            .unwrap();
        world
            .create_body(
                EntityId(2),
                &BodyDef::dynamic()
                    .with_position(Vec2::new(2.0, 0.0))
                    .with_velocity(Vec2::new(-4.0, 0.0)),
                &ball(0.5),
            )
            .unwrap();

        let mut all_events = Vec::new();
        for _ in 0..60 {
            world.step(60);
            all_events.extend(world.poll_contact_events());
        }

        let started: Vec<_> = all_events.iter().filter(|e| e.started).collect();
        assert!(!started.is_empty(), "expected at least one contact-begin");
        let ids = [started[0].entity_a, started[0].entity_b];
        assert!(ids.contains(&EntityId(1)));
        assert!(ids.contains(&EntityId(2)));
    }

    #[test]
    fn poll_consumes_events_exactly_once() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world
            .create_body(
                EntityId(1),
                &BodyDef::dynamic().with_velocity(Vec2::new(4.0, 0.0)),
                &ball(0.5),
            )
            .unwrap();
        world
            .create_body(
                EntityId(2),
                &BodyDef::dynamic()
                    .with_position(Vec2::new(2.0, 0.0))
                    .with_velocity(Vec2::new(-4.0, 0.0)),
                &ball(0.5),
            )
            .unwrap();

        let mut total = 0;
        for _ in 0..60 {
            world.step(60);
        }
        total += world.poll_contact_events().len();
        assert!(total > 0);
        assert!(world.poll_contact_events().is_empty());
    }

    #[test]
    fn sensor_reports_contacts() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world
            .create_body(
                EntityId(1),
                &BodyDef::fixed().with_position(Vec2::new(2.0, 0.0)),
                &ball(0.5).with_sensor(true),
            )
            .unwrap();
        world
            .create_body(
                EntityId(2),
                &BodyDef::dynamic().with_velocity(Vec2::new(4.0, 0.0)),
                &ball(0.5),
            )
            .unwrap();

        for _ in 0..120 {
            world.step(60);
        }
        let events = world.poll_contact_events();
        assert!(
            events.iter().any(|e| e.started),
            "sensor should still report contact-begin"
        );
    }

    #[test]
    fn builder_pattern() {
        let def = BodyDef::dynamic()
            .with_position(Vec2::new(1.0, 2.0))
            .with_velocity(Vec2::new(3.0, 4.0))
            .with_fixed_rotation(true)
            .with_bullet(true);
        assert_eq!(def.body_type, BodyType::Dynamic);
        assert_eq!(def.position, Vec2::new(1.0, 2.0));
        assert_eq!(def.velocity, Vec2::new(3.0, 4.0));
        assert!(def.fixed_rotation);
        assert!(def.bullet);

        let mat = ball(0.5)
            .with_density(2.0)
            .with_friction(0.9)
            .with_restitution(0.1)
            .with_sensor(true);
        assert!((mat.density - 2.0).abs() < 0.001);
        assert!((mat.friction - 0.9).abs() < 0.001);
        assert!((mat.restitution - 0.1).abs() < 0.001);
        assert!(mat.sensor);
    }
}
