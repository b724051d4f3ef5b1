use crate::api::types::SoundId;
use crate::components::ReadyState;

/// Audio source component.
///
/// The engine never decodes or mixes audio. A source holds a host-defined
/// sound id; calling [`trigger`](Self::trigger) queues a playback request
/// that the engine collects once per frame for the host sound system.
#[derive(Debug, Clone)]
pub struct AudioSourceComponent {
    pub sound: SoundId,
    /// Playback volume, 0.0 to 1.0.
    pub volume: f32,
    pub looping: bool,
    pub state: ReadyState,
    /// Set by `trigger`, cleared when the engine collects the request.
    pub(crate) pending: bool,
}

impl AudioSourceComponent {
    pub fn new(sound: SoundId) -> Self {
        Self {
            sound,
            volume: 1.0,
            looping: false,
            state: ReadyState::Initializing,
            pending: false,
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Request playback. Collected by the engine on the next update pass.
    pub fn trigger(&mut self) {
        self.pending = true;
    }

    /// Take the pending request, if any.
    pub(crate) fn take_trigger(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}
