//! Level reset requests.
//!
//! Triggered by the player (explicit reset) or by
//! [`check_step_budget`](crate::systems::steps::check_step_budget) when the
//! step budget runs out. The active level record is discarded and the same
//! depth is built again from scratch.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::events::levelstate::request_level_state;
use crate::resources::levelprogression::LevelProgression;
use crate::resources::levelstate::{LevelState, LevelStates, NextLevelState};

#[derive(Event, Debug, Clone, Copy)]
pub struct ResetLevelEvent {}

/// Honoured while the level is ready, or after generation gave up.
pub fn observe_reset_level(
    _trigger: On<ResetLevelEvent>,
    mut commands: Commands,
    level_state: Res<LevelState>,
    mut next_level_state: ResMut<NextLevelState>,
    mut progression: ResMut<LevelProgression>,
) {
    match level_state.get() {
        LevelStates::Ready | LevelStates::Failed => {
            info!("Resetting dungeon level {}", progression.depth());
            progression.discard_current();
            progression.reset_attempts();
            request_level_state(&mut commands, &mut next_level_state, LevelStates::Building);
        }
        other => debug!("Reset ignored while level is {:?}", other),
    }
}
