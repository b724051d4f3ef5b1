//! Engine core: time, the entity tree, messaging and the physics bridge.

pub mod message;
#[cfg(feature = "physics")]
pub mod physics;
pub mod timer;
pub mod world;
