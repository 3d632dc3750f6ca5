//! Enable/disable switch for scene actors.
//!
//! Actors are disabled while a level is built or repopulated, so a failed
//! attempt is never playable. Only a successful population enables them.

use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Interactable {
    enabled: bool,
}

impl Interactable {
    /// A disabled interactable.
    pub fn new() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }
}
