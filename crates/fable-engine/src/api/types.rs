use thiserror::Error;

/// Unique identifier for an entity in the world tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// A sound event emitted by an audio-source component.
/// The numeric value maps to a host-defined sound; the engine never decodes audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundId(pub u32);

/// A playback request collected from an audio-source component, forwarded
/// to the host sound system once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundEvent {
    pub sound: SoundId,
    /// Playback volume, 0.0 to 1.0.
    pub volume: f32,
}

/// Errors surfaced by the engine core.
///
/// Tree-shape errors (`DuplicateAttachment`, `NotAttached`, `CyclicAttachment`)
/// are local and recoverable — the caller decides whether to treat them as
/// fatal. Steady-state drop conditions (unresolvable message receivers, stale
/// physics user-data) are never errors; they are logged and skipped so a
/// destroyed entity cannot halt the frame loop.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("entity {0:?} is already attached to a parent")]
    DuplicateAttachment(EntityId),

    #[error("entity {0:?} is not attached to any parent")]
    NotAttached(EntityId),

    #[error("attaching entity {child:?} under {parent:?} would create a cycle")]
    CyclicAttachment { parent: EntityId, child: EntityId },

    #[error("no entity with id {0:?}")]
    NoSuchEntity(EntityId),

    #[error("physics body budget exhausted ({0} bodies)")]
    BodyBudgetExhausted(usize),

    #[error("entity {0:?} already has a bound physics body")]
    BodyAlreadyBound(EntityId),

    #[error("behavior update failed: {0}")]
    Behavior(String),
}
