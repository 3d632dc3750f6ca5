//! Exit reached: descend one level.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

use crate::events::levelstate::request_level_state;
use crate::resources::levelprogression::LevelProgression;
use crate::resources::levelstate::{LevelState, LevelStates, NextLevelState};

/// The player stepped onto the exit.
#[derive(Event, Debug, Clone, Copy)]
pub struct ExitReachedEvent {}

/// Advances the depth and rebuilds. Only honoured while the level is ready.
pub fn observe_exit_reached(
    _trigger: On<ExitReachedEvent>,
    mut commands: Commands,
    level_state: Res<LevelState>,
    mut next_level_state: ResMut<NextLevelState>,
    mut progression: ResMut<LevelProgression>,
) {
    if level_state.get() != LevelStates::Ready {
        debug!("Exit ignored while level is {:?}", level_state.get());
        return;
    }
    progression.advance();
    request_level_state(&mut commands, &mut next_level_state, LevelStates::Building);
}
