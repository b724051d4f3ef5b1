//! Bitmap-font text components.
//!
//! Text renders through the sprite pipeline: each printable character maps to
//! a glyph cell in a font atlas laid out in ASCII order, typically 16 columns
//! by 6 rows for printable ASCII (32-127).

use glam::Vec2;

use crate::components::sprite::AtlasId;
use crate::components::ReadyState;

/// Configuration for a bitmap font atlas.
#[derive(Debug, Clone)]
pub struct FontConfig {
    /// Which atlas contains the glyphs.
    pub atlas: AtlasId,
    /// Columns in the font atlas grid.
    pub cols: u32,
    /// Rows in the font atlas grid.
    pub rows: u32,
    /// First ASCII code in the atlas (typically 32 = space).
    pub start_char: u8,
    /// Horizontal advance as a fraction of character size.
    pub spacing: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            atlas: AtlasId(1), // convention: atlas 0 = sprites, atlas 1 = font
            cols: 16,
            rows: 6,
            start_char: 32,
            spacing: 0.55,
        }
    }
}

impl FontConfig {
    pub fn new(atlas: AtlasId) -> Self {
        Self {
            atlas,
            ..Default::default()
        }
    }

    pub fn with_grid(mut self, cols: u32, rows: u32) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Grid coordinates (col, row) of a character's glyph, or `None` when
    /// the character is outside this font's range.
    pub fn glyph(&self, c: char) -> Option<(f32, f32)> {
        let ascii = c as u32;
        let start = self.start_char as u32;
        if ascii < start {
            return None;
        }
        let index = ascii - start;
        if index >= self.cols * self.rows {
            return None;
        }
        Some(((index % self.cols) as f32, (index / self.cols) as f32))
    }
}

/// Static text component.
///
/// Starts `Initializing` until the host confirms the font atlas is loaded.
#[derive(Debug, Clone)]
pub struct TextComponent {
    pub content: String,
    pub font: FontConfig,
    /// Size of each character in world units.
    pub char_size: f32,
    pub alpha: f32,
    pub state: ReadyState,
}

impl TextComponent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font: FontConfig::default(),
            char_size: 16.0,
            alpha: 1.0,
            state: ReadyState::Initializing,
        }
    }

    pub fn with_font(mut self, font: FontConfig) -> Self {
        self.font = font;
        self
    }

    pub fn with_char_size(mut self, char_size: f32) -> Self {
        self.char_size = char_size;
        self
    }
}

/// Short-lived floating text (damage numbers, pickups): drifts along a
/// velocity and fades out over its lifetime, then expires.
///
/// Procedural — no asset dependency, so it starts `Ready`.
#[derive(Debug, Clone)]
pub struct FlyTextComponent {
    pub content: String,
    pub font: FontConfig,
    pub char_size: f32,
    /// Drift in world units per second (typically upward).
    pub velocity: Vec2,
    /// Accumulated offset from the owning entity's position.
    pub offset: Vec2,
    /// Seconds the text stays alive.
    pub lifetime: f32,
    /// Seconds elapsed since spawn.
    pub age: f32,
    pub state: ReadyState,
}

impl FlyTextComponent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font: FontConfig::default(),
            char_size: 12.0,
            velocity: Vec2::new(0.0, -24.0),
            offset: Vec2::ZERO,
            lifetime: 1.5,
            age: 0.0,
            state: ReadyState::Ready,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_char_size(mut self, char_size: f32) -> Self {
        self.char_size = char_size;
        self
    }

    /// Advance the drift and fade by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.age += dt;
        self.offset += self.velocity * dt;
    }

    /// Remaining opacity: 1.0 at spawn, 0.0 at expiry.
    pub fn alpha(&self) -> f32 {
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }

    pub fn expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_lookup_ascii() {
        let font = FontConfig::default();
        // Space is the first glyph.
        assert_eq!(font.glyph(' '), Some((0.0, 0.0)));
        // '!' is the next cell.
        assert_eq!(font.glyph('!'), Some((1.0, 0.0)));
        // 'A' = 65, index 33 -> col 1, row 2 in a 16-wide grid.
        assert_eq!(font.glyph('A'), Some((1.0, 2.0)));
    }

    #[test]
    fn glyph_out_of_range() {
        let font = FontConfig::default();
        assert_eq!(font.glyph('\n'), None);
        assert_eq!(font.glyph('\u{1F600}'), None);
    }

    #[test]
    fn fly_text_drifts_and_fades() {
        let mut fly = FlyTextComponent::new("+10").with_lifetime(1.0);
        fly.tick(0.5);
        assert!((fly.alpha() - 0.5).abs() < 0.001);
        assert!(fly.offset.y < 0.0, "default drift is upward (Y-down)");
        assert!(!fly.expired());

        fly.tick(0.6);
        assert!(fly.expired());
        assert_eq!(fly.alpha(), 0.0);
    }
}
