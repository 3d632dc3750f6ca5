//! Registry of level state enter hooks.
//!
//! Maps each [`LevelStates`] value to the [`bevy_ecs::system::SystemId`] of
//! the one-shot system run when that state is entered. The state observer
//! looks hooks up here, so states and hooks stay decoupled.

use bevy_ecs::prelude::Resource;
use bevy_ecs::system::SystemId;
use rustc_hash::FxHashMap;

use crate::resources::levelstate::LevelStates;

/// Map of level states to enter hook system IDs.
#[derive(Resource, Default)]
pub struct SystemsStore {
    pub map: FxHashMap<LevelStates, SystemId>,
}

impl SystemsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        SystemsStore {
            map: FxHashMap::default(),
        }
    }

    /// Register the enter hook for `state`, replacing any previous one.
    pub fn insert(&mut self, state: LevelStates, id: SystemId) {
        self.map.insert(state, id);
    }

    /// Enter hook for `state`, if registered.
    pub fn get(&self, state: LevelStates) -> Option<&SystemId> {
        self.map.get(&state)
    }
}
