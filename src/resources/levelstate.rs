//! Level lifecycle state resources.
//!
//! These resources track the authoritative state of the active level and any
//! pending transition requested by systems or observers. See
//! `crate::events::levelstate::observe_level_state_change_event` for how a
//! transition is applied and the enter hooks are invoked.
//!
//! ```text
//! NotBuilt ──► Building ──► Populating ──► Ready ──► Building (reset / exit / budget)
//!                 ▲              │
//!                 │              ├──► Rebuilding ──┘ (population failed)
//!                 │              └──► Failed (retry limit reached)
//!                 └────────────────────── Failed (explicit reset)
//! ```

use bevy_ecs::prelude::Resource;

/// Discrete states of the level pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LevelStates {
    #[default]
    NotBuilt,
    Building,
    Populating,
    Ready,
    Rebuilding,
    /// Population kept failing for one depth; no further automatic rebuilds.
    Failed,
}

impl LevelStates {
    /// Whether `self -> next` is an edge of the level state machine.
    pub fn can_transition_to(self, next: LevelStates) -> bool {
        use LevelStates::*;
        matches!(
            (self, next),
            (NotBuilt, Building)
                | (Building, Populating)
                | (Populating, Ready)
                | (Populating, Rebuilding)
                | (Populating, Failed)
                | (Rebuilding, Building)
                | (Ready, Building)
                | (Failed, Building)
        )
    }
}

/// Representation of a requested next state.
///
/// Use [`NextLevelState::set`] to mark a transition as pending; an observer
/// will later apply it and reset the value to [`NextLevelStates::Unchanged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NextLevelStates {
    #[default]
    Unchanged,
    Pending(LevelStates),
}

/// Authoritative current level state.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LevelState {
    current: LevelStates,
}

impl LevelState {
    /// Create a new state initialized to [`LevelStates::NotBuilt`].
    pub fn new() -> Self {
        LevelState {
            current: LevelStates::NotBuilt,
        }
    }
    /// Read-only access to the current state.
    pub fn get(&self) -> LevelStates {
        self.current
    }
    /// Update the current state immediately, skipping enter hooks.
    pub fn set(&mut self, state: LevelStates) {
        self.current = state;
    }
}

/// Intent to change to a new level state.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NextLevelState {
    next: NextLevelStates,
}

impl NextLevelState {
    /// Create a new value initialized to [`NextLevelStates::Unchanged`].
    pub fn new() -> Self {
        NextLevelState {
            next: NextLevelStates::Unchanged,
        }
    }

    /// Get the current transition request.
    pub fn get(&self) -> NextLevelStates {
        self.next
    }

    /// Request a transition to `next`. The latest request wins.
    pub fn set(&mut self, next: LevelStates) {
        self.next = NextLevelStates::Pending(next);
    }

    /// Reset to [`NextLevelStates::Unchanged`].
    pub fn reset(&mut self) {
        self.next = NextLevelStates::Unchanged;
    }
}
