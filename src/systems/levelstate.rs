use crate::events::levelstate::LevelStateChangedEvent;
use crate::resources::levelstate::{LevelState, LevelStates, NextLevelState, NextLevelStates};
use bevy_ecs::prelude::*;

/// Trigger the transition observer when a request is still pending.
pub fn check_pending_state(mut commands: Commands, next_state: Res<NextLevelState>) {
    if let NextLevelStates::Pending(_new_state) = next_state.get() {
        commands.trigger(LevelStateChangedEvent {});
    }
}

pub fn state_is_building(state: Res<LevelState>) -> bool {
    matches!(state.get(), LevelStates::Building)
}

pub fn state_is_ready(state: Res<LevelState>) -> bool {
    matches!(state.get(), LevelStates::Ready)
}
