//! Population pass: choose player and exit tiles for a freshly built level.
//!
//! Runs once when the level enters [`LevelStates::Populating`]. On success
//! the player and exit are moved onto their tiles (centred, half a tile
//! offset), the camera is pointed at the player and both actors are enabled.
//! On failure the attempt is discarded through
//! [`LevelStates::Rebuilding`], or the pipeline gives up with
//! [`LevelStates::Failed`] once the per-depth retry limit is reached.
//!
//! # Placement policies
//!
//! - [`PlacementPolicy::RoomOrdered`]: rooms are taken in generator order.
//!   With one room, the first two floor tiles scanned become player and exit.
//!   With several, the player gets the first floor tile of the first room and
//!   the exit the first floor tile of the last room.
//! - [`PlacementPolicy::RandomRooms`]: two distinct rooms are picked at random
//!   and a random floor tile is taken from each; coinciding tiles fail.
//!
//! Within a room tiles are scanned column by column (`x` outer, `y` inner).

use bevy_ecs::prelude::*;
use fastrand::Rng;
use log::{debug, error, warn};

use crate::components::exit::Exit;
use crate::components::interactable::Interactable;
use crate::components::mapposition::MapPosition;
use crate::components::player::Player;
use crate::events::levelstate::LevelStateChangedEvent;
use crate::resources::camera::CameraFrame;
use crate::resources::dungeonconfig::DungeonConfig;
use crate::resources::leveldata::{LevelData, Room, TileGrid, TilePos};
use crate::resources::levelprogression::LevelProgression;
use crate::resources::levelstate::{LevelStates, NextLevelState};
use crate::resources::rng::LevelRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementPolicy {
    #[default]
    RoomOrdered,
    RandomRooms,
}

/// Outcome of one population pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementResult {
    pub player: Option<TilePos>,
    pub exit: Option<TilePos>,
    pub success: bool,
}

impl PlacementResult {
    /// Successful only when both tiles exist and differ.
    pub fn new(player: Option<TilePos>, exit: Option<TilePos>) -> Self {
        let success = matches!((player, exit), (Some(p), Some(e)) if p != e);
        Self {
            player,
            exit,
            success,
        }
    }

    pub fn failed() -> Self {
        Self::new(None, None)
    }

    /// `(player, exit)` when the placement succeeded.
    pub fn positions(&self) -> Option<(TilePos, TilePos)> {
        match (self.success, self.player, self.exit) {
            (true, Some(player), Some(exit)) => Some((player, exit)),
            _ => None,
        }
    }
}

fn floor_tiles<'a>(grid: &'a TileGrid, room: &'a Room) -> impl Iterator<Item = TilePos> + 'a {
    room.tiles().filter(move |t| grid.is_floor(t.x, t.y))
}

/// Room-ordered placement.
pub fn place_room_ordered(grid: &TileGrid, rooms: &[Room]) -> PlacementResult {
    match rooms {
        [] => PlacementResult::failed(),
        [only] => {
            let mut floors = floor_tiles(grid, only);
            let player = floors.next();
            let exit = floors.next();
            PlacementResult::new(player, exit)
        }
        [first, .., last] => {
            let player = floor_tiles(grid, first).next();
            let exit = floor_tiles(grid, last).next();
            PlacementResult::new(player, exit)
        }
    }
}

/// Random placement across two distinct rooms.
pub fn place_random_rooms(grid: &TileGrid, rooms: &[Room], rng: &mut Rng) -> PlacementResult {
    let candidates: Vec<Vec<TilePos>> = rooms
        .iter()
        .map(|room| floor_tiles(grid, room).collect::<Vec<_>>())
        .filter(|tiles| !tiles.is_empty())
        .collect();
    if candidates.len() < 2 {
        return PlacementResult::failed();
    }

    let a = rng.usize(0..candidates.len());
    let mut b = rng.usize(0..candidates.len() - 1);
    if b >= a {
        b += 1;
    }
    let player = candidates[a][rng.usize(0..candidates[a].len())];
    let exit = candidates[b][rng.usize(0..candidates[b].len())];
    PlacementResult::new(Some(player), Some(exit))
}

pub fn choose_placement(
    policy: PlacementPolicy,
    grid: &TileGrid,
    rooms: &[Room],
    rng: &mut Rng,
) -> PlacementResult {
    match policy {
        PlacementPolicy::RoomOrdered => place_room_ordered(grid, rooms),
        PlacementPolicy::RandomRooms => place_random_rooms(grid, rooms, rng),
    }
}

/// Enter hook for [`LevelStates::Populating`].
///
/// Always requests exactly one follow-up transition: `Ready` on success,
/// `Rebuilding` or `Failed` otherwise.
#[allow(clippy::too_many_arguments)]
pub fn populate_level(
    mut commands: Commands,
    level: Res<LevelData>,
    config: Res<DungeonConfig>,
    mut rng: ResMut<LevelRng>,
    mut progression: ResMut<LevelProgression>,
    mut next_state: ResMut<NextLevelState>,
    mut camera: ResMut<CameraFrame>,
    mut players: Query<(&mut MapPosition, &mut Interactable), (With<Player>, Without<Exit>)>,
    mut exits: Query<(&mut MapPosition, &mut Interactable), (With<Exit>, Without<Player>)>,
) {
    let placement = choose_placement(
        config.placement_policy,
        &level.grid,
        &level.rooms,
        &mut rng.0,
    );

    match placement.positions() {
        Some((player_tile, exit_tile)) => {
            debug!("Player at {:?}, exit at {:?}", player_tile, exit_tile);
            let (px, py) = player_tile.center();
            for (mut position, mut interactable) in players.iter_mut() {
                *position = MapPosition::at_tile(player_tile);
                interactable.enable();
            }
            for (mut position, mut interactable) in exits.iter_mut() {
                *position = MapPosition::at_tile(exit_tile);
                interactable.enable();
            }
            camera.follow(px, py);
            progression.level_populated(&level.rooms, level.grid.origin());
            next_state.set(LevelStates::Ready);
        }
        None => {
            if progression.register_failed_attempt() {
                warn!(
                    "Population failed for depth {} (attempt {}/{}), rebuilding",
                    progression.depth(),
                    progression.failed_attempts(),
                    progression.max_attempts()
                );
                next_state.set(LevelStates::Rebuilding);
            } else {
                error!(
                    "Population failed {} times for depth {}, giving up",
                    progression.failed_attempts(),
                    progression.depth()
                );
                next_state.set(LevelStates::Failed);
            }
        }
    }
    commands.trigger(LevelStateChangedEvent {});
}
