//! World setup, level state hooks and the headless main loop.
//!
//! [`init_world`] inserts every resource the pipeline needs, spawns the
//! player and exit actors, registers the enter hooks in [`SystemsStore`] and
//! adds the observers. [`build_schedule`] returns the per-frame schedule and
//! [`run`] drives it until the level is ready, generation gave up or the
//! frame limit is reached.

use bevy_ecs::prelude::*;
use log::{debug, error, info};

use crate::components::exit::Exit;
use crate::components::interactable::Interactable;
use crate::components::mapposition::MapPosition;
use crate::components::player::Player;
use crate::events::exit::observe_exit_reached;
use crate::events::levelbuilt::{LevelBuiltEvent, observe_level_built};
use crate::events::levelstate::{
    LevelStateChangedEvent, observe_level_state_change_event, request_level_state,
};
use crate::events::reset::observe_reset_level;
use crate::events::steps::observe_step_taken;
use crate::resources::camera::CameraFrame;
use crate::resources::dungeonconfig::DungeonConfig;
use crate::resources::frameclock::FrameClock;
use crate::resources::hud::LevelHud;
use crate::resources::levelbuilder::{BuildProgress, LevelBuildError, LevelBuilder};
use crate::resources::leveldata::LevelData;
use crate::resources::levelprogression::LevelProgression;
use crate::resources::levelstate::{LevelState, LevelStates, NextLevelState};
use crate::resources::rng::LevelRng;
use crate::resources::systemsstore::SystemsStore;
use crate::stages::colliders::CollidersStage;
use crate::stages::dungeon::{DungeonGenerator, DungeonStage, RoomsAndCorridors};
use crate::stages::map::MapStage;
use crate::stages::renderer::RendererStage;
use crate::stages::spawners::ActorSpawnersStage;
use crate::systems::camera::camera_follow_player;
use crate::systems::hud::{refresh_level_hud, update_level_hud};
use crate::systems::levelbuilder::tick_level_builder;
use crate::systems::levelstate::{check_pending_state, state_is_building, state_is_ready};
use crate::systems::population::populate_level;
use crate::systems::steps::check_step_budget;
use crate::systems::time::advance_frame_clock;

/// Default layout generator configured from `config`.
pub fn default_generator(config: &DungeonConfig) -> Box<dyn DungeonGenerator> {
    Box::new(
        RoomsAndCorridors::new(config.seed).with_room_limits(
            config.max_rooms,
            config.room_min,
            config.room_max,
        ),
    )
}

/// The standard stage list: Map, Dungeon, Colliders, Renderer, ActorSpawners.
pub fn standard_builder(
    config: &DungeonConfig,
    generator: Box<dyn DungeonGenerator>,
) -> Result<LevelBuilder, LevelBuildError> {
    LevelBuilder::new(config.build_mode)
        .with_strict(config.strict)
        .with_stage(Box::new(MapStage::new()))?
        .with_stage(Box::new(DungeonStage::new(generator)))?
        .with_stage(Box::new(CollidersStage::new()))?
        .with_stage(Box::new(RendererStage::new(config.render_rows_per_tick)))?
        .with_stage(Box::new(ActorSpawnersStage::new()))
}

/// Create a world using the default generator.
pub fn init_world(config: DungeonConfig) -> Result<World, LevelBuildError> {
    let generator = default_generator(&config);
    init_world_with_generator(config, generator)
}

/// Create a world whose Dungeon stage uses `generator`.
pub fn init_world_with_generator(
    config: DungeonConfig,
    generator: Box<dyn DungeonGenerator>,
) -> Result<World, LevelBuildError> {
    let builder = standard_builder(&config, generator)?;

    let mut world = World::new();
    world.insert_resource(LevelState::new());
    world.insert_resource(NextLevelState::new());
    world.insert_resource(LevelProgression::new(
        config.start_depth,
        config.max_attempts,
    ));
    world.insert_resource(LevelData::default());
    world.insert_resource(LevelRng::new(config.seed));
    world.insert_resource(CameraFrame::default());
    world.insert_resource(LevelHud::default());
    world.insert_resource(FrameClock::default());
    world.insert_resource(builder);
    world.insert_resource(config);

    world.spawn((Player::default(), MapPosition::default(), Interactable::new()));
    world.spawn((Exit, MapPosition::default(), Interactable::new()));

    let mut systems_store = SystemsStore::new();
    systems_store.insert(LevelStates::Building, world.register_system(enter_building));
    systems_store.insert(LevelStates::Populating, world.register_system(populate_level));
    systems_store.insert(
        LevelStates::Rebuilding,
        world.register_system(enter_rebuilding),
    );
    systems_store.insert(LevelStates::Ready, world.register_system(enter_ready));
    systems_store.insert(LevelStates::Failed, world.register_system(enter_failed));
    world.insert_resource(systems_store);

    world.add_observer(observe_level_state_change_event);
    world.add_observer(observe_level_built);
    world.add_observer(observe_step_taken);
    world.add_observer(observe_exit_reached);
    world.add_observer(observe_reset_level);
    // Observers must exist before anything triggers events.
    world.flush();

    Ok(world)
}

/// Per-frame schedule.
pub fn build_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(check_pending_state);
    update.add_systems(
        tick_level_builder
            .run_if(state_is_building)
            .after(check_pending_state),
    );
    update.add_systems(
        (check_step_budget, camera_follow_player, update_level_hud)
            .chain()
            .run_if(state_is_ready)
            .after(check_pending_state),
    );
    update
}

/// Request the first build.
pub fn start(world: &mut World) {
    world
        .resource_mut::<NextLevelState>()
        .set(LevelStates::Building);
    world.trigger(LevelStateChangedEvent {});
    world.flush();
}

/// Run frames until the level is ready or failed, or `max_ticks` frames
/// have passed. Returns the state reached.
pub fn run(world: &mut World, schedule: &mut Schedule, max_ticks: u64) -> LevelStates {
    for _ in 0..max_ticks {
        let state = world.resource::<LevelState>().get();
        if matches!(state, LevelStates::Ready | LevelStates::Failed) {
            return state;
        }
        tick(world, schedule);
    }
    world.resource::<LevelState>().get()
}

/// One frame.
pub fn tick(world: &mut World, schedule: &mut Schedule) {
    advance_frame_clock(world);
    schedule.run(world);
    world.flush();
    world.clear_trackers();
}

/// Enter hook for [`LevelStates::Building`].
///
/// Opens (or reuses) the level record for the current depth, sizes the grid
/// and the camera, hides the actors and the HUD, then starts a fresh build
/// cycle. In immediate mode the cycle completes here and the level moves on
/// to population straight away.
#[allow(clippy::too_many_arguments)]
pub fn enter_building(
    mut commands: Commands,
    mut progression: ResMut<LevelProgression>,
    mut builder: ResMut<LevelBuilder>,
    mut level: ResMut<LevelData>,
    mut camera: ResMut<CameraFrame>,
    mut hud: ResMut<LevelHud>,
    mut interactables: Query<&mut Interactable>,
) {
    let (width, height) = progression.begin_level().size();
    info!(
        "Building dungeon level {} ({}x{})",
        progression.depth(),
        width,
        height
    );
    camera.frame_grid(width, height);
    hud.enabled = false;
    for mut interactable in interactables.iter_mut() {
        interactable.disable();
    }

    let level = &mut *level;
    builder.dispose_with_dependencies(level);
    level.resize(width, height);
    match builder.build(level) {
        Ok(BuildProgress::Complete(kind)) => commands.trigger(LevelBuiltEvent { kind }),
        Ok(progress) => debug!("Level build started: {:?}", progress),
        Err(e) => error!("Level build could not start: {}", e),
    }
}

/// Enter hook for [`LevelStates::Rebuilding`]: drop the failed attempt and
/// build the same depth again.
pub fn enter_rebuilding(
    mut commands: Commands,
    mut progression: ResMut<LevelProgression>,
    mut next_state: ResMut<NextLevelState>,
) {
    progression.discard_current();
    request_level_state(&mut commands, &mut next_state, LevelStates::Building);
}

/// Enter hook for [`LevelStates::Ready`]: show the HUD with fresh values.
pub fn enter_ready(
    mut hud: ResMut<LevelHud>,
    progression: Res<LevelProgression>,
    clock: Res<FrameClock>,
    players: Query<&Player>,
) {
    hud.enabled = true;
    refresh_level_hud(&mut hud, &progression, &players);
    info!(
        "Dungeon level {} ready at frame {}",
        progression.depth(),
        clock.frame_count
    );
}

/// Enter hook for [`LevelStates::Failed`].
pub fn enter_failed(progression: Res<LevelProgression>) {
    error!(
        "Dungeon level {} could not be populated after {} attempts",
        progression.depth(),
        progression.failed_attempts()
    );
}
