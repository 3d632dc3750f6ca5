//! Player marker component.

use bevy_ecs::prelude::Component;

/// The controllable character. `steps` counts every step taken across levels.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Player {
    pub steps: u32,
}

impl Player {
    pub fn step(&mut self) {
        self.steps += 1;
    }
}
