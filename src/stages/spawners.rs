//! ActorSpawners stage: spawn points for actors in intermediate rooms.
//!
//! The first room belongs to the player and the last one to the exit, so
//! only the rooms in between receive a spawn point.

use log::debug;

use crate::resources::leveldata::{LevelData, Room, SpawnPoint, TileGrid, TilePos};
use crate::stages::{LevelStage, StageContext, StageKind};

/// Floor tile of `room` closest to its centre, if any.
fn nearest_floor_to_center(grid: &TileGrid, room: &Room) -> Option<TilePos> {
    let (cx, cy) = room.center();
    room.tiles()
        .filter(|t| grid.is_floor(t.x, t.y))
        .min_by(|a, b| {
            let da = distance_sq(a.center(), (cx, cy));
            let db = distance_sq(b.center(), (cx, cy));
            da.total_cmp(&db)
        })
}

fn distance_sq(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

#[derive(Debug, Default)]
pub struct ActorSpawnersStage {
    built: bool,
}

impl ActorSpawnersStage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LevelStage for ActorSpawnersStage {
    fn kind(&self) -> StageKind {
        StageKind::ActorSpawners
    }

    fn is_built(&self) -> bool {
        self.built
    }

    fn build(&mut self, level: &mut LevelData, ctx: StageContext) {
        let count = level.rooms.len();
        level.spawn_points = level
            .rooms
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 0 && *i + 1 != count)
            .filter_map(|(i, room)| {
                nearest_floor_to_center(&level.grid, room).map(|tile| SpawnPoint { tile, room: i })
            })
            .collect();
        self.built = true;
        debug!("Actor spawners built: {}", level.spawn_points.len());
        ctx.completion.complete();
    }

    fn dispose(&mut self, level: &mut LevelData) {
        level.spawn_points.clear();
        self.built = false;
    }
}
