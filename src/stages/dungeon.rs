//! Dungeon stage: carves rooms into the grid allocated by the Map stage.
//!
//! The layout algorithm itself lives behind [`DungeonGenerator`] so that the
//! pipeline can be driven by any generator (including fixed layouts in tests).
//!
//! # Room order contract
//!
//! Generators must return rooms ordered by connectivity: the first room is
//! where the player starts and the last room is the most remote one. The
//! population pass places the player in the first room and the exit in the
//! last; a generator that ignores this still produces valid levels, just with
//! exits that may sit next to the start.

use fastrand::Rng;
use log::debug;

use crate::resources::leveldata::{LevelData, Room, TileGrid, TilePos, TileType};
use crate::stages::{LevelStage, StageContext, StageKind};

/// Dungeon layout collaborator. Writes floor tiles into `grid` and returns
/// the rooms in the order described in the module docs.
pub trait DungeonGenerator: Send + Sync {
    fn generate(&mut self, grid: &mut TileGrid) -> Vec<Room>;
}

/// Default generator: non-overlapping rectangular rooms joined by L-shaped
/// corridors between consecutive rooms.
#[derive(Debug)]
pub struct RoomsAndCorridors {
    rng: Rng,
    pub max_rooms: u32,
    pub room_min: u32,
    pub room_max: u32,
}

impl RoomsAndCorridors {
    /// `seed == 0` draws a random seed.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            Rng::new()
        } else {
            Rng::with_seed(seed)
        };
        Self {
            rng,
            max_rooms: 6,
            room_min: 2,
            room_max: 5,
        }
    }

    pub fn with_room_limits(mut self, max_rooms: u32, room_min: u32, room_max: u32) -> Self {
        self.max_rooms = max_rooms.max(1);
        self.room_min = room_min.max(1);
        self.room_max = room_max.max(self.room_min);
        self
    }

    fn place_rooms(&mut self, grid: &TileGrid) -> Vec<Room> {
        let mut rooms: Vec<Room> = Vec::new();
        let attempts = self.max_rooms * 4;
        for _ in 0..attempts {
            if rooms.len() as u32 >= self.max_rooms {
                break;
            }
            let w = self.rng.u32(self.room_min..=self.room_max);
            let h = self.rng.u32(self.room_min..=self.room_max);
            // one tile of wall around the border
            if w + 2 > grid.width() || h + 2 > grid.height() {
                continue;
            }
            let left = self.rng.u32(1..=grid.width() - w - 1);
            let top = self.rng.u32(1..=grid.height() - h - 1);
            let candidate = Room::new(left, top, w, h);
            if rooms.iter().all(|r| !r.intersects(&candidate, 1)) {
                rooms.push(candidate);
            }
        }
        rooms
    }

    fn carve_corridor(&mut self, grid: &mut TileGrid, from: TilePos, to: TilePos) {
        let horizontal_first = self.rng.bool();
        let corner = if horizontal_first {
            TilePos::new(to.x, from.y)
        } else {
            TilePos::new(from.x, to.y)
        };
        carve_line(grid, from, corner);
        carve_line(grid, corner, to);
    }
}

fn carve_line(grid: &mut TileGrid, from: TilePos, to: TilePos) {
    let (x0, x1) = (from.x.min(to.x), from.x.max(to.x));
    let (y0, y1) = (from.y.min(to.y), from.y.max(to.y));
    for x in x0..=x1 {
        for y in y0..=y1 {
            grid.set(x, y, TileType::Floor);
        }
    }
}

/// Keep the first room, order the rest by distance from it.
fn order_by_remoteness(rooms: &mut [Room]) {
    let Some((first, rest)) = rooms.split_first_mut() else {
        return;
    };
    let (fx, fy) = first.center();
    let dist = |r: &Room| {
        let (x, y) = r.center();
        (x - fx).hypot(y - fy)
    };
    rest.sort_by(|a, b| dist(a).total_cmp(&dist(b)));
}

impl DungeonGenerator for RoomsAndCorridors {
    fn generate(&mut self, grid: &mut TileGrid) -> Vec<Room> {
        let mut rooms = self.place_rooms(grid);
        order_by_remoteness(&mut rooms);

        for room in &rooms {
            for tile in room.tiles() {
                grid.set(tile.x, tile.y, TileType::Floor);
            }
        }
        for pair in rooms.windows(2) {
            self.carve_corridor(grid, pair[0].center_tile(), pair[1].center_tile());
        }
        rooms
    }
}

/// Stage wrapper around a [`DungeonGenerator`].
pub struct DungeonStage {
    generator: Box<dyn DungeonGenerator>,
    built: bool,
}

impl DungeonStage {
    pub fn new(generator: Box<dyn DungeonGenerator>) -> Self {
        Self {
            generator,
            built: false,
        }
    }
}

impl LevelStage for DungeonStage {
    fn kind(&self) -> StageKind {
        StageKind::Dungeon
    }

    fn is_built(&self) -> bool {
        self.built
    }

    fn build(&mut self, level: &mut LevelData, ctx: StageContext) {
        level.rooms = self.generator.generate(&mut level.grid);
        self.built = true;
        debug!(
            "Dungeon built: {} rooms, {} floor tiles",
            level.rooms.len(),
            level.grid.count(TileType::Floor)
        );
        ctx.completion.complete();
    }

    fn dispose(&mut self, level: &mut LevelData) {
        level.rooms.clear();
        self.built = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooms_stay_inside_border() {
        let mut grid = TileGrid::new(20, 20);
        let rooms = RoomsAndCorridors::new(7).generate(&mut grid);
        assert!(!rooms.is_empty());
        for room in &rooms {
            assert!(room.left >= 1 && room.top >= 1);
            assert!(room.right() < 20 && room.bottom() < 20);
        }
    }

    #[test]
    fn test_rooms_do_not_overlap() {
        let mut grid = TileGrid::new(30, 30);
        let rooms = RoomsAndCorridors::new(42)
            .with_room_limits(8, 2, 4)
            .generate(&mut grid);
        for (i, a) in rooms.iter().enumerate() {
            for b in rooms.iter().skip(i + 1) {
                assert!(!a.intersects(b, 0));
            }
        }
    }

    #[test]
    fn test_room_tiles_are_carved_as_floor() {
        let mut grid = TileGrid::new(16, 16);
        let rooms = RoomsAndCorridors::new(3).generate(&mut grid);
        for room in &rooms {
            assert!(room.tiles().all(|t| grid.is_floor(t.x, t.y)));
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut a = TileGrid::new(14, 14);
        let mut b = TileGrid::new(14, 14);
        let rooms_a = RoomsAndCorridors::new(99).generate(&mut a);
        let rooms_b = RoomsAndCorridors::new(99).generate(&mut b);
        assert_eq!(rooms_a, rooms_b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rooms_ordered_by_distance_from_first() {
        let mut rooms = vec![
            Room::new(0, 0, 2, 2),
            Room::new(20, 20, 2, 2),
            Room::new(5, 0, 2, 2),
        ];
        order_by_remoteness(&mut rooms);
        assert_eq!(rooms[0], Room::new(0, 0, 2, 2));
        assert_eq!(rooms[1], Room::new(5, 0, 2, 2));
        assert_eq!(rooms[2], Room::new(20, 20, 2, 2));
    }

    #[test]
    fn test_tiny_grid_produces_no_rooms() {
        let mut grid = TileGrid::new(3, 3);
        let rooms = RoomsAndCorridors::new(1)
            .with_room_limits(4, 2, 2)
            .generate(&mut grid);
        assert!(rooms.is_empty());
        assert_eq!(grid.count(TileType::Floor), 0);
    }
}
