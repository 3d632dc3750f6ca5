//! Dungeon pipeline configuration resource.
//!
//! Settings are loaded from an INI configuration file. Defaults are safe to
//! start with; missing keys keep their current values.
//!
//! # Configuration File Format
//!
//! ```ini
//! [build]
//! mode = per_tick
//! render_rows_per_tick = 4
//! strict = false
//!
//! [dungeon]
//! start_depth = 1
//! seed = 0
//! max_rooms = 6
//! room_min = 2
//! room_max = 5
//!
//! [population]
//! policy = room_ordered
//! max_attempts = 8
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

use crate::stages::BuildMode;
use crate::systems::population::PlacementPolicy;

const DEFAULT_RENDER_ROWS_PER_TICK: u32 = 4;
const DEFAULT_START_DEPTH: u32 = 1;
const DEFAULT_SEED: u64 = 0;
const DEFAULT_MAX_ROOMS: u32 = 6;
const DEFAULT_ROOM_MIN: u32 = 2;
const DEFAULT_ROOM_MAX: u32 = 5;
const DEFAULT_MAX_ATTEMPTS: u32 = 8;
const DEFAULT_CONFIG_PATH: &str = "./dungeon.ini";

fn parse_build_mode(value: &str) -> Option<BuildMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "immediate" | "tooling" => Some(BuildMode::Immediate),
        "per_tick" | "tick" | "live" => Some(BuildMode::PerTick),
        _ => None,
    }
}

fn build_mode_name(mode: BuildMode) -> &'static str {
    match mode {
        BuildMode::Immediate => "immediate",
        BuildMode::PerTick => "per_tick",
    }
}

fn parse_policy(value: &str) -> Option<PlacementPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "room_ordered" | "ordered" => Some(PlacementPolicy::RoomOrdered),
        "random_rooms" | "random" => Some(PlacementPolicy::RandomRooms),
        _ => None,
    }
}

fn policy_name(policy: PlacementPolicy) -> &'static str {
    match policy {
        PlacementPolicy::RoomOrdered => "room_ordered",
        PlacementPolicy::RandomRooms => "random_rooms",
    }
}

/// Dungeon pipeline configuration.
#[derive(Resource, Debug, Clone)]
pub struct DungeonConfig {
    /// How the level builder drives its stages.
    pub build_mode: BuildMode,
    /// Glyph rows the renderer stage produces per frame in per-tick mode.
    pub render_rows_per_tick: u32,
    /// Panic on build contract violations instead of logging them.
    pub strict: bool,
    /// Depth of the first level.
    pub start_depth: u32,
    /// Layout seed; 0 picks a random seed.
    pub seed: u64,
    pub max_rooms: u32,
    pub room_min: u32,
    pub room_max: u32,
    pub placement_policy: PlacementPolicy,
    /// Population failures tolerated per depth before giving up.
    pub max_attempts: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DungeonConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            build_mode: BuildMode::PerTick,
            render_rows_per_tick: DEFAULT_RENDER_ROWS_PER_TICK,
            strict: cfg!(debug_assertions),
            start_depth: DEFAULT_START_DEPTH,
            seed: DEFAULT_SEED,
            max_rooms: DEFAULT_MAX_ROOMS,
            room_min: DEFAULT_ROOM_MIN,
            room_max: DEFAULT_ROOM_MAX,
            placement_policy: PlacementPolicy::RoomOrdered,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values; unknown enum
    /// values are logged and ignored.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [build] section
        if let Some(mode) = config.get("build", "mode") {
            match parse_build_mode(&mode) {
                Some(mode) => self.build_mode = mode,
                None => warn!("Unknown build mode '{}', keeping {:?}", mode, self.build_mode),
            }
        }
        if let Some(rows) = config.getuint("build", "render_rows_per_tick").ok().flatten() {
            self.render_rows_per_tick = (rows as u32).max(1);
        }
        if let Some(strict) = config.getbool("build", "strict").ok().flatten() {
            self.strict = strict;
        }

        // [dungeon] section
        if let Some(depth) = config.getuint("dungeon", "start_depth").ok().flatten() {
            self.start_depth = (depth as u32).max(1);
        }
        if let Some(seed) = config.getuint("dungeon", "seed").ok().flatten() {
            self.seed = seed;
        }
        if let Some(max_rooms) = config.getuint("dungeon", "max_rooms").ok().flatten() {
            self.max_rooms = max_rooms as u32;
        }
        if let Some(room_min) = config.getuint("dungeon", "room_min").ok().flatten() {
            self.room_min = room_min as u32;
        }
        if let Some(room_max) = config.getuint("dungeon", "room_max").ok().flatten() {
            self.room_max = room_max as u32;
        }

        // [population] section
        if let Some(policy) = config.get("population", "policy") {
            match parse_policy(&policy) {
                Some(policy) => self.placement_policy = policy,
                None => warn!(
                    "Unknown placement policy '{}', keeping {:?}",
                    policy, self.placement_policy
                ),
            }
        }
        if let Some(attempts) = config.getuint("population", "max_attempts").ok().flatten() {
            self.max_attempts = (attempts as u32).max(1);
        }

        info!(
            "Loaded config: mode={:?}, start_depth={}, seed={}, rooms={} ({}..={}), policy={:?}, max_attempts={}",
            self.build_mode,
            self.start_depth,
            self.seed,
            self.max_rooms,
            self.room_min,
            self.room_max,
            self.placement_policy,
            self.max_attempts
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [build] section
        config.set("build", "mode", Some(build_mode_name(self.build_mode).to_string()));
        config.set(
            "build",
            "render_rows_per_tick",
            Some(self.render_rows_per_tick.to_string()),
        );
        config.set("build", "strict", Some(self.strict.to_string()));

        // [dungeon] section
        config.set("dungeon", "start_depth", Some(self.start_depth.to_string()));
        config.set("dungeon", "seed", Some(self.seed.to_string()));
        config.set("dungeon", "max_rooms", Some(self.max_rooms.to_string()));
        config.set("dungeon", "room_min", Some(self.room_min.to_string()));
        config.set("dungeon", "room_max", Some(self.room_max.to_string()));

        // [population] section
        config.set(
            "population",
            "policy",
            Some(policy_name(self.placement_policy).to_string()),
        );
        config.set(
            "population",
            "max_attempts",
            Some(self.max_attempts.to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DungeonConfig::new();
        assert_eq!(config.build_mode, BuildMode::PerTick);
        assert_eq!(config.start_depth, 1);
        assert_eq!(config.max_attempts, 8);
        assert_eq!(config.placement_policy, PlacementPolicy::RoomOrdered);
    }

    #[test]
    fn test_missing_file_is_an_error_and_keeps_defaults() {
        let mut config = DungeonConfig::with_path("/nonexistent/dungeon.ini");
        assert!(config.load_from_file().is_err());
        assert_eq!(config.max_rooms, DEFAULT_MAX_ROOMS);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[build]\nmode = immediate\n\n[population]\npolicy = random_rooms\nmax_attempts = 0").unwrap();

        let mut config = DungeonConfig::with_path(file.path());
        config.load_from_file().unwrap();
        assert_eq!(config.build_mode, BuildMode::Immediate);
        assert_eq!(config.placement_policy, PlacementPolicy::RandomRooms);
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.start_depth, DEFAULT_START_DEPTH);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dungeon.ini");

        let mut saved = DungeonConfig::with_path(&path);
        saved.build_mode = BuildMode::Immediate;
        saved.seed = 1234;
        saved.start_depth = 3;
        saved.save_to_file().unwrap();

        let mut loaded = DungeonConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded.build_mode, BuildMode::Immediate);
        assert_eq!(loaded.seed, 1234);
        assert_eq!(loaded.start_depth, 3);
    }

    #[test]
    fn test_unknown_mode_is_ignored() {
        assert_eq!(parse_build_mode("sideways"), None);
        assert_eq!(parse_build_mode(" Live "), Some(BuildMode::PerTick));
    }
}
