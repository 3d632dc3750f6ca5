//! Values exposed to the HUD collaborator.
//!
//! The HUD shows the dungeon level, the steps left in the level budget and
//! the total steps the player has taken. It is hidden while a level is being
//! built or repopulated and shown again once the level is ready.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelHud {
    pub enabled: bool,
    pub level: u32,
    pub steps_left: i32,
    pub steps_taken: u32,
}

impl LevelHud {
    pub fn level_label(&self) -> String {
        format!("Dungeon Level: {}", self.level)
    }

    pub fn steps_left_label(&self) -> String {
        format!("Steps Left: {}", self.steps_left)
    }

    pub fn steps_taken_label(&self) -> String {
        format!("Steps Taken: {}", self.steps_taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let hud = LevelHud {
            enabled: true,
            level: 3,
            steps_left: 12,
            steps_taken: 40,
        };
        assert_eq!(hud.level_label(), "Dungeon Level: 3");
        assert_eq!(hud.steps_left_label(), "Steps Left: 12");
        assert_eq!(hud.steps_taken_label(), "Steps Taken: 40");
    }
}
