//! Player step notifications.
//!
//! The movement collaborator triggers a [`StepTakenEvent`] for every tile the
//! player moves. Steps only count while the level is ready.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

use crate::components::interactable::Interactable;
use crate::components::player::Player;
use crate::resources::levelprogression::LevelProgression;
use crate::resources::levelstate::{LevelState, LevelStates};

#[derive(Event, Debug, Clone, Copy)]
pub struct StepTakenEvent {}

pub fn observe_step_taken(
    _trigger: On<StepTakenEvent>,
    level_state: Res<LevelState>,
    mut progression: ResMut<LevelProgression>,
    mut players: Query<(&mut Player, &Interactable)>,
) {
    if level_state.get() != LevelStates::Ready {
        debug!("Step ignored while level is {:?}", level_state.get());
        return;
    }
    progression.step_taken();
    for (mut player, interactable) in players.iter_mut() {
        if interactable.is_enabled() {
            player.step();
        }
    }
}
