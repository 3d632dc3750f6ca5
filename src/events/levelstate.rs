//! Level state transition event and observer.
//!
//! Systems request a change of [`LevelStates`] by updating
//! [`NextLevelState`] and triggering a [`LevelStateChangedEvent`]. The
//! observer in this module validates the transition against the level state
//! machine, applies it to [`LevelState`] and runs the enter hook registered
//! for the new state in [`SystemsStore`].
//!
//! This decouples the intent to change state from the mechanics of running
//! hooks and avoids borrowing conflicts.
use crate::resources::levelstate::NextLevelStates::{Pending, Unchanged};
use crate::resources::levelstate::{LevelState, LevelStates, NextLevelState};
use crate::resources::systemsstore::SystemsStore;
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{debug, info, warn};

/// Event used to indicate that a pending level state transition should be
/// applied.
///
/// Triggering this event causes [`observe_level_state_change_event`] to read
/// [`NextLevelState`]. If it contains [`Pending`], the observer updates the
/// authoritative [`LevelState`], runs the enter hook and clears the pending
/// value; if it is [`Unchanged`], nothing happens.
#[derive(Event, Debug, Clone, Copy)]
pub struct LevelStateChangedEvent {}

/// Request `state` and trigger the transition.
pub fn request_level_state(
    commands: &mut Commands,
    next_level_state: &mut NextLevelState,
    state: LevelStates,
) {
    next_level_state.set(state);
    commands.trigger(LevelStateChangedEvent {});
}

/// Observer that applies a pending level state transition.
///
/// Contract
/// - Reads the intention from [`NextLevelState`] and always clears it.
/// - Transitions that are not edges of the state machine are logged and
///   dropped; the current state is kept.
/// - Otherwise copies the new value into [`LevelState`] and runs the enter
///   hook stored in [`SystemsStore`] for it, if any.
/// - If any required resource is missing, logs a diagnostic and returns.
pub fn observe_level_state_change_event(
    _trigger: On<LevelStateChangedEvent>,
    mut commands: Commands,
    mut next_level_state: Option<ResMut<NextLevelState>>,
    mut level_state: Option<ResMut<LevelState>>,
    systems_store: Res<SystemsStore>,
) {
    debug!("LevelStateChangedEvent triggered");

    if let (Some(next_level_state), Some(level_state)) =
        (next_level_state.as_deref_mut(), level_state.as_deref_mut())
    {
        match next_level_state.get() {
            Pending(new_state) => {
                let old_state = level_state.get();
                next_level_state.reset();
                if !old_state.can_transition_to(new_state) {
                    warn!(
                        "Rejected level transition from {:?} to {:?}",
                        old_state, new_state
                    );
                    return;
                }
                info!("Level transitioning from {:?} to {:?}", old_state, new_state);
                level_state.set(new_state);
                on_state_enter(new_state, &mut commands, &systems_store);
            }
            Unchanged => {
                debug!("No level state change pending.");
            }
        }
    } else {
        warn!(
            "One or more resources missing in observe_level_state_change_event. next_state: {:?}, level_state: {:?}",
            next_level_state.is_some(),
            level_state.is_some()
        );
    }
}

/// Internal: run the enter hook registered for `state`.
fn on_state_enter(state: LevelStates, commands: &mut Commands, systems_store: &SystemsStore) {
    match systems_store.get(state) {
        Some(system_id) => commands.run_system(*system_id),
        None => debug!("No enter hook for {:?}", state),
    }
}
