//! Tilemap component: a grid of tile indices referencing atlas cells.
//!
//! The component holds level data and coordinate conversions only; turning
//! tiles into pixels is the render backend's job. Level data round-trips
//! through serde so maps can be authored as JSON.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::sprite::AtlasId;
use crate::components::ReadyState;

/// A single tile. Empty cells are stored as `None` in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Column in the atlas grid.
    pub col: f32,
    /// Row in the atlas grid.
    pub row: f32,
    /// Rotation in radians.
    #[serde(default)]
    pub rotation: f32,
}

impl Tile {
    pub fn new(col: f32, row: f32) -> Self {
        Self {
            col,
            row,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Tilemap component. Tiles are stored row-major: `index = y * width + x`.
///
/// Starts `Initializing`; the host advances the state once the tile atlas
/// is available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilemapComponent {
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Edge length of one tile in world units.
    pub tile_size: f32,
    pub atlas: AtlasId,
    /// World-space position of the grid's top-left corner, relative to the
    /// owning entity.
    pub origin: Vec2,
    #[serde(default)]
    pub state: ReadyState,
    tiles: Vec<Option<Tile>>,
}

impl TilemapComponent {
    pub fn new(width: u32, height: u32, tile_size: f32) -> Self {
        let count = (width * height) as usize;
        Self {
            width,
            height,
            tile_size,
            atlas: AtlasId(0),
            origin: Vec2::ZERO,
            state: ReadyState::Initializing,
            tiles: vec![None; count],
        }
    }

    pub fn with_atlas(mut self, atlas: AtlasId) -> Self {
        self.atlas = atlas;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles[(y * self.width + x) as usize].as_ref()
    }

    pub fn set(&mut self, x: u32, y: u32, tile: Option<Tile>) {
        if x < self.width && y < self.height {
            self.tiles[(y * self.width + x) as usize] = tile;
        }
    }

    /// Fill a rectangular region with a tile.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, tile: Option<Tile>) {
        for ty in y..(y + h).min(self.height) {
            for tx in x..(x + w).min(self.width) {
                self.set(tx, ty, tile);
            }
        }
    }

    pub fn clear(&mut self) {
        self.tiles.fill(None);
    }

    /// Local position (relative to the owning entity) of a tile's center.
    pub fn tile_to_local(&self, x: u32, y: u32) -> Vec2 {
        let half = self.tile_size / 2.0;
        self.origin
            + Vec2::new(
                x as f32 * self.tile_size + half,
                y as f32 * self.tile_size + half,
            )
    }

    /// Grid coordinates of a local position, or `None` when outside the map.
    pub fn local_to_tile(&self, local: Vec2) -> Option<(u32, u32)> {
        let p = local - self.origin;
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let tx = (p.x / self.tile_size) as u32;
        let ty = (p.y / self.tile_size) as u32;
        if tx >= self.width || ty >= self.height {
            return None;
        }
        Some((tx, ty))
    }

    /// Iterate non-empty tiles as `(x, y, tile)`.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (u32, u32, &Tile)> {
        self.tiles.iter().enumerate().filter_map(move |(i, t)| {
            t.as_ref()
                .map(|tile| (i as u32 % self.width, i as u32 / self.width, tile))
        })
    }

    /// Count of non-empty tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    pub fn capacity(&self) -> usize {
        (self.width * self.height) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tilemap_is_empty() {
        let tm = TilemapComponent::new(10, 10, 32.0);
        assert_eq!(tm.tile_count(), 0);
        assert_eq!(tm.capacity(), 100);
    }

    #[test]
    fn set_get_and_bounds() {
        let mut tm = TilemapComponent::new(5, 5, 16.0);
        tm.set(2, 3, Some(Tile::new(1.0, 4.0)));
        let got = tm.get(2, 3).unwrap();
        assert_eq!(got.col, 1.0);
        assert_eq!(got.row, 4.0);
        assert!(tm.get(10, 10).is_none());
    }

    #[test]
    fn fill_rect_and_clear() {
        let mut tm = TilemapComponent::new(10, 10, 32.0);
        tm.fill_rect(2, 2, 3, 3, Some(Tile::new(0.0, 0.0)));
        assert_eq!(tm.tile_count(), 9);
        tm.clear();
        assert_eq!(tm.tile_count(), 0);
    }

    #[test]
    fn coordinate_round_trip() {
        let tm = TilemapComponent::new(10, 10, 32.0).with_origin(Vec2::new(100.0, 200.0));
        let center = tm.tile_to_local(5, 5);
        assert_eq!(tm.local_to_tile(center), Some((5, 5)));
        assert!(tm.local_to_tile(Vec2::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn iter_tiles_yields_coordinates() {
        let mut tm = TilemapComponent::new(4, 4, 8.0);
        tm.set(1, 2, Some(Tile::new(3.0, 0.0)));
        let tiles: Vec<_> = tm.iter_tiles().collect();
        assert_eq!(tiles.len(), 1);
        let (x, y, tile) = tiles[0];
        assert_eq!((x, y), (1, 2));
        assert_eq!(tile.col, 3.0);
    }

    #[test]
    fn level_data_round_trips_through_json() {
        let mut tm = TilemapComponent::new(3, 2, 16.0).with_origin(Vec2::new(8.0, 8.0));
        tm.set(0, 0, Some(Tile::new(1.0, 1.0)));
        tm.set(2, 1, Some(Tile::new(2.0, 0.0).with_rotation(1.5)));

        let json = serde_json::to_string(&tm).unwrap();
        let back: TilemapComponent = serde_json::from_str(&json).unwrap();

        assert_eq!(back.width, 3);
        assert_eq!(back.tile_count(), 2);
        assert_eq!(back.get(2, 1).unwrap().rotation, 1.5);
        assert_eq!(back.origin, Vec2::new(8.0, 8.0));
    }
}
