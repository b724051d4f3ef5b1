use crate::components::ReadyState;
use crate::core::physics::{BodyDef, MaterialDef, PhysicsBody};

/// Rigid body component.
///
/// Carries the body and fixture definitions until the engine binds them to
/// a simulation body on the first physics step after the entity goes live.
/// The simulation is metric; `pixels_per_meter` converts between simulation
/// coordinates and entity world coordinates. The default of 64 keeps bodies
/// in the 0.1–10 m band the simulation is tuned for at typical sprite sizes.
#[derive(Debug, Clone)]
pub struct RigidBodyComponent {
    pub def: BodyDef,
    pub material: MaterialDef,
    /// World units per simulation meter.
    pub pixels_per_meter: f32,
    pub state: ReadyState,
    pub(crate) handle: Option<PhysicsBody>,
}

impl RigidBodyComponent {
    pub const DEFAULT_PIXELS_PER_METER: f32 = 64.0;

    pub fn new(def: BodyDef, material: MaterialDef) -> Self {
        Self {
            def,
            material,
            pixels_per_meter: Self::DEFAULT_PIXELS_PER_METER,
            state: ReadyState::Initializing,
            handle: None,
        }
    }

    pub fn with_pixels_per_meter(mut self, pixels_per_meter: f32) -> Self {
        self.pixels_per_meter = pixels_per_meter;
        self
    }

    /// Whether this component is bound to a simulation body yet.
    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    /// The opaque simulation handle, once bound.
    pub fn handle(&self) -> Option<PhysicsBody> {
        self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::physics::ShapeDesc;

    #[test]
    fn starts_unbound() {
        let rb = RigidBodyComponent::new(
            BodyDef::dynamic(),
            MaterialDef::new(ShapeDesc::Ball { radius: 0.5 }),
        );
        assert!(!rb.is_bound());
        assert_eq!(rb.state, ReadyState::Initializing);
        assert_eq!(rb.pixels_per_meter, 64.0);
    }
}
