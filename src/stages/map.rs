//! Map stage: allocates the tile grid for the requested level size.

use log::debug;

use crate::resources::leveldata::{LevelData, TileGrid};
use crate::stages::{LevelStage, StageContext, StageKind};

/// Creates a wall-filled [`TileGrid`] of [`LevelData::size`] and clears the
/// room list so the Dungeon stage starts from a blank map.
#[derive(Debug, Default)]
pub struct MapStage {
    built: bool,
}

impl MapStage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LevelStage for MapStage {
    fn kind(&self) -> StageKind {
        StageKind::Map
    }

    fn is_built(&self) -> bool {
        self.built
    }

    fn build(&mut self, level: &mut LevelData, ctx: StageContext) {
        let (width, height) = level.size;
        level.grid = TileGrid::new(width, height);
        level.rooms.clear();
        self.built = true;
        debug!("Map built: {}x{}", width, height);
        ctx.completion.complete();
    }

    fn dispose(&mut self, level: &mut LevelData) {
        level.grid = TileGrid::default();
        level.rooms.clear();
        self.built = false;
    }
}
