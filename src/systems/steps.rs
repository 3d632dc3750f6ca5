use bevy_ecs::prelude::*;
use log::info;

use crate::events::reset::ResetLevelEvent;
use crate::resources::levelprogression::LevelProgression;

/// Reset the level once its step budget is spent. Runs only while ready.
pub fn check_step_budget(mut commands: Commands, progression: Res<LevelProgression>) {
    let Some(record) = progression.current() else {
        return;
    };
    if record.steps_left() <= 0 {
        info!(
            "Step budget of dungeon level {} exhausted ({} steps)",
            record.id(),
            record.steps_taken()
        );
        commands.trigger(ResetLevelEvent {});
    }
}
