//! Shared level data written by the generation stages.
//!
//! [`LevelData`] is the single piece of mutable state the stages share. The
//! Map and Dungeon stages are its only writers for the tile grid and room
//! list; Colliders, Renderer, ActorSpawners and the population pass only read
//! them. Stages run strictly one after another, so no locking is involved.
//! Do not read the grid or rooms before the aggregated
//! [`LevelBuiltEvent`](crate::events::levelbuilt::LevelBuiltEvent) fired.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::stages::colliders::WallCollider;

/// Tile types known to the level pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Wall,
    Floor,
}

/// Integer tile coordinate inside a [`TileGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: u32,
    pub y: u32,
}

impl TilePos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// World-space centre of the tile (tile coordinate + half a tile).
    pub fn center(&self) -> (f32, f32) {
        (self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

/// Row-major 2D array of typed tiles.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<TileType>,
}

impl TileGrid {
    /// Create a grid of the given size filled with [`TileType::Wall`].
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TileType::Wall)
    }

    pub fn filled(width: u32, height: u32, tile: TileType) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }

    /// Tile at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<TileType> {
        if self.in_bounds(x, y) {
            Some(self.tiles[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn is_floor(&self, x: u32, y: u32) -> bool {
        self.get(x, y) == Some(TileType::Floor)
    }

    /// Set the tile at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, tile: TileType) {
        if self.in_bounds(x, y) {
            let index = self.index(x, y);
            self.tiles[index] = tile;
        }
    }

    pub fn count(&self, tile: TileType) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }

    /// Geometric centre of the grid in tile units.
    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 * 0.5, self.height as f32 * 0.5)
    }

    /// Fixed origin point used for step budget computation.
    pub fn origin(&self) -> (f32, f32) {
        (0.0, 0.0)
    }
}

/// Axis-aligned room rectangle produced by the dungeon generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Room {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.left as f32 + self.width as f32 * 0.5,
            self.top as f32 + self.height as f32 * 0.5,
        )
    }

    /// Center rounded down to a tile coordinate.
    pub fn center_tile(&self) -> TilePos {
        TilePos::new(self.left + self.width / 2, self.top + self.height / 2)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    /// Overlap test that also treats rooms closer than `margin` tiles as overlapping.
    pub fn intersects(&self, other: &Room, margin: u32) -> bool {
        self.left < other.right() + margin
            && other.left < self.right() + margin
            && self.top < other.bottom() + margin
            && other.top < self.bottom() + margin
    }

    /// Tiles of the room in scan order: columns outer, rows inner.
    pub fn tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        (0..self.width).flat_map(move |x| {
            (0..self.height).map(move |y| TilePos::new(self.left + x, self.top + y))
        })
    }
}

/// Actor spawn location chosen by the ActorSpawners stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub tile: TilePos,
    /// Index of the room the spawn point belongs to.
    pub room: usize,
}

/// Level content shared by all stages of a build cycle.
#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct LevelData {
    /// Requested grid size for the next build cycle.
    pub size: (u32, u32),
    pub grid: TileGrid,
    pub rooms: Vec<Room>,
    #[serde(skip)]
    pub colliders: Vec<WallCollider>,
    pub render_rows: Vec<String>,
    pub spawn_points: Vec<SpawnPoint>,
}

impl LevelData {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..Self::default()
        }
    }

    /// Request a new grid size for the next build cycle.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }
}
