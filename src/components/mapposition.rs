use bevy_ecs::prelude::Component;

use crate::resources::leveldata::TilePos;

/// World-space position of an actor, in tile units.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct MapPosition {
    pub x: f32,
    pub y: f32,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Centre of a tile (tile coordinate + half a tile).
    pub fn at_tile(tile: TilePos) -> Self {
        let (x, y) = tile.center();
        Self { x, y }
    }
}
