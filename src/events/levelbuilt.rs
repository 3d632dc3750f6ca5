//! Aggregated "level built" event.
//!
//! Triggered once per build cycle, when every stage of the
//! [`LevelBuilder`](crate::resources::levelbuilder::LevelBuilder) has
//! reported completion. Only after this event may the tile grid and rooms in
//! [`LevelData`](crate::resources::leveldata::LevelData) be read.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::events::levelstate::request_level_state;
use crate::resources::levelstate::{LevelState, LevelStates, NextLevelState};
use crate::stages::StageKind;

/// Every stage of the builder completed. `kind` is the builder's own kind.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBuiltEvent {
    pub kind: StageKind,
}

/// Moves a level that is building on to population.
pub fn observe_level_built(
    trigger: On<LevelBuiltEvent>,
    mut commands: Commands,
    level_state: Res<LevelState>,
    mut next_level_state: ResMut<NextLevelState>,
) {
    let kind = trigger.event().kind;
    if level_state.get() != LevelStates::Building {
        warn!(
            "{:?} finished while level is {:?}; ignored",
            kind,
            level_state.get()
        );
        return;
    }
    debug!("{:?} finished, populating level", kind);
    request_level_state(&mut commands, &mut next_level_state, LevelStates::Populating);
}
