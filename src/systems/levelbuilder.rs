//! Per-frame driver for the level builder.
//!
//! In [`BuildMode::PerTick`](crate::stages::BuildMode::PerTick) the builder
//! only makes progress when ticked. This system ticks it once per frame while
//! the level is building and raises [`LevelBuiltEvent`] when the cycle
//! completes.
use bevy_ecs::prelude::*;
use log::warn;

use crate::events::levelbuilt::LevelBuiltEvent;
use crate::resources::levelbuilder::{BuildProgress, LevelBuilder};
use crate::resources::leveldata::LevelData;

pub fn tick_level_builder(
    mut commands: Commands,
    mut builder: ResMut<LevelBuilder>,
    mut level: ResMut<LevelData>,
) {
    match builder.tick(&mut level) {
        Ok(BuildProgress::Complete(kind)) => commands.trigger(LevelBuiltEvent { kind }),
        Ok(_) => {}
        Err(e) => warn!("Level builder tick rejected: {}", e),
    }
}
