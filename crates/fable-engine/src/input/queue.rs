/// Host input events, already translated to world coordinates.
/// The engine attaches no semantics; behaviors interpret them.
#[derive(Debug, Clone, Copy)]
pub enum InputEvent {
    /// A press began at world coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// A press ended at world coordinates (x, y).
    PointerUp { x: f32, y: f32 },
    /// The pointer moved to world coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    KeyDown { key_code: u32 },
    KeyUp { key_code: u32 },
    /// An event from outside the canvas (UI buttons and the like).
    /// `kind` identifies it; `data` carries whatever the host packed in.
    Custom { kind: u32, data: [f32; 3] },
}

/// Pending input, written by the host between frames and drained by the
/// engine at the end of each step.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take all pending events, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Look at pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
