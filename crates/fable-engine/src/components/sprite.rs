use crate::components::ReadyState;

/// Identifies which texture atlas a sprite's cells come from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub struct AtlasId(pub u32);

/// Blend mode for sprite rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending.
    #[default]
    Alpha,
    /// Additive blending for glow effects.
    Additive,
}

/// Sprite component — how an entity appears visually.
///
/// Starts `Initializing`; the host advances the state as the backing
/// texture atlas loads. Only `Ready` sprites reach the render buffer.
#[derive(Debug, Clone)]
pub struct SpriteComponent {
    pub atlas: AtlasId,
    /// Column in the atlas grid.
    pub col: f32,
    /// Row in the atlas grid.
    pub row: f32,
    /// Number of cells this sprite spans (1.0 = single cell).
    pub cell_span: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    pub blend: BlendMode,
    pub state: ReadyState,
}

impl Default for SpriteComponent {
    fn default() -> Self {
        Self {
            atlas: AtlasId(0),
            col: 0.0,
            row: 0.0,
            cell_span: 1.0,
            alpha: 1.0,
            blend: BlendMode::Alpha,
            state: ReadyState::Initializing,
        }
    }
}

impl SpriteComponent {
    /// Create a sprite pointing at the given atlas cell.
    pub fn new(atlas: AtlasId, col: f32, row: f32) -> Self {
        Self {
            atlas,
            col,
            row,
            ..Default::default()
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }
}
