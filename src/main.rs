//! Dungeon Stager main entry point.
//!
//! Builds procedural dungeon levels headlessly using:
//! - **bevy_ecs** for resources, observers and the per-frame schedule
//! - **configparser** for the INI configuration file
//! - **clap** for command line overrides
//!
//! # Main Loop
//!
//! 1. Load `dungeon.ini` (defaults when missing) and apply CLI overrides
//! 2. Create the world, register hooks and observers
//! 3. Request the first build and run frames until the level is ready
//! 4. Optionally walk steps, descend through exits and dump the level
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --depth 3 --immediate --dump
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use dungeon_stager::events::exit::ExitReachedEvent;
use dungeon_stager::events::steps::StepTakenEvent;
use dungeon_stager::game;
use dungeon_stager::resources::dungeonconfig::DungeonConfig;
use dungeon_stager::resources::hud::LevelHud;
use dungeon_stager::resources::leveldata::LevelData;
use dungeon_stager::resources::levelstate::{LevelState, LevelStates};
use dungeon_stager::stages::BuildMode;

/// Procedural dungeon level builder
#[derive(Parser)]
#[command(version, about = "Builds procedural dungeon levels stage by stage.")]
struct Cli {
    /// Configuration file.
    #[arg(long, value_name = "PATH", default_value = "./dungeon.ini")]
    config: PathBuf,

    /// Start depth, overrides the configuration file.
    #[arg(long)]
    depth: Option<u32>,

    /// Layout seed, overrides the configuration file (0 = random).
    #[arg(long)]
    seed: Option<u64>,

    /// Build every stage synchronously instead of one per frame.
    #[arg(long)]
    immediate: bool,

    /// Frames allowed for each level to become ready.
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u64,

    /// Steps to walk on the first ready level.
    #[arg(long, default_value_t = 0)]
    steps: u32,

    /// Levels to descend after the first one is ready.
    #[arg(long, default_value_t = 0)]
    descend: u32,

    /// Print the final level as JSON.
    #[arg(long)]
    dump: bool,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    save_config: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = DungeonConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        info!("{}; using defaults", e);
    }
    if let Some(depth) = cli.depth {
        config.start_depth = depth.max(1);
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if cli.immediate {
        config.build_mode = BuildMode::Immediate;
    }

    if cli.save_config {
        return match config.save_to_file() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let mut world = match game::init_world(config) {
        Ok(world) => world,
        Err(e) => {
            error!("Could not set up the level builder: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut schedule = game::build_schedule();

    game::start(&mut world);
    let mut state = game::run(&mut world, &mut schedule, cli.max_ticks);

    for _ in 0..cli.steps {
        if state != LevelStates::Ready {
            break;
        }
        world.trigger(StepTakenEvent {});
        world.flush();
        game::tick(&mut world, &mut schedule);
        state = game::run(&mut world, &mut schedule, cli.max_ticks);
    }

    for _ in 0..cli.descend {
        if state != LevelStates::Ready {
            break;
        }
        world.trigger(ExitReachedEvent {});
        world.flush();
        state = game::run(&mut world, &mut schedule, cli.max_ticks);
    }

    let hud = world.resource::<LevelHud>();
    info!(
        "{} | {} | {}",
        hud.level_label(),
        hud.steps_left_label(),
        hud.steps_taken_label()
    );

    if cli.dump {
        match serde_json::to_string_pretty(world.resource::<LevelData>()) {
            Ok(json) => println!("{json}"),
            Err(e) => error!("Could not serialize level: {}", e),
        }
    } else {
        for row in &world.resource::<LevelData>().render_rows {
            println!("{row}");
        }
    }

    match world.resource::<LevelState>().get() {
        LevelStates::Ready => ExitCode::SUCCESS,
        other => {
            error!("Level pipeline stopped in state {:?}", other);
            ExitCode::FAILURE
        }
    }
}
