//! Colliders stage: one unit box collider per wall tile.

use log::debug;

use crate::resources::leveldata::{LevelData, TileType};
use crate::stages::{LevelStage, StageContext, StageKind};

/// Axis-aligned box collider for a wall tile.
///
/// `offset` is the collider centre relative to the grid centre, matching how
/// the level is positioned in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallCollider {
    pub offset: (f32, f32),
    pub size: (f32, f32),
}

impl WallCollider {
    pub fn unit(offset: (f32, f32)) -> Self {
        Self {
            offset,
            size: (1.0, 1.0),
        }
    }
}

#[derive(Debug, Default)]
pub struct CollidersStage {
    built: bool,
}

impl CollidersStage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LevelStage for CollidersStage {
    fn kind(&self) -> StageKind {
        StageKind::Colliders
    }

    fn is_built(&self) -> bool {
        self.built
    }

    fn build(&mut self, level: &mut LevelData, ctx: StageContext) {
        let (cx, cy) = level.grid.center();
        let grid = &level.grid;
        level.colliders = (0..grid.width())
            .flat_map(|x| (0..grid.height()).map(move |y| (x, y)))
            .filter(|&(x, y)| grid.get(x, y) == Some(TileType::Wall))
            .map(|(x, y)| WallCollider::unit((x as f32 + 0.5 - cx, y as f32 + 0.5 - cy)))
            .collect();
        self.built = true;
        debug!("Colliders built: {}", level.colliders.len());
        ctx.completion.complete();
    }

    fn dispose(&mut self, level: &mut LevelData) {
        level.colliders.clear();
        self.built = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::leveldata::TileGrid;
    use crate::stages::{BuildMode, StageCompletion};
    use crossbeam_channel::unbounded;

    fn ctx() -> StageContext {
        let (tx, _rx) = unbounded();
        StageContext {
            mode: BuildMode::Immediate,
            completion: StageCompletion::new(StageKind::Colliders, 1, tx),
        }
    }

    #[test]
    fn test_one_collider_per_wall() {
        let mut level = LevelData::new(4, 4);
        level.grid = TileGrid::new(4, 4);
        level.grid.set(1, 1, TileType::Floor);
        level.grid.set(2, 1, TileType::Floor);

        let mut stage = CollidersStage::new();
        stage.build(&mut level, ctx());

        assert!(stage.is_built());
        assert_eq!(level.colliders.len(), 14);
    }

    #[test]
    fn test_collider_offset_is_relative_to_grid_center() {
        let mut level = LevelData::new(2, 2);
        level.grid = TileGrid::new(2, 2);

        let mut stage = CollidersStage::new();
        stage.build(&mut level, ctx());

        assert_eq!(level.colliders[0].offset, (-0.5, -0.5));
        assert_eq!(level.colliders[0].size, (1.0, 1.0));
        assert_eq!(level.colliders[3].offset, (0.5, 0.5));
    }

    #[test]
    fn test_dispose_destroys_colliders_even_when_never_built() {
        let mut level = LevelData::new(2, 2);
        let mut stage = CollidersStage::new();
        stage.dispose(&mut level);
        assert!(!stage.is_built());

        level.grid = TileGrid::new(2, 2);
        stage.build(&mut level, ctx());
        stage.dispose(&mut level);
        assert!(level.colliders.is_empty());
        assert!(!stage.is_built());
    }
}
