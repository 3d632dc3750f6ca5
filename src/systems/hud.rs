//! HUD refresh.
//!
//! Copies the depth, the remaining budget and the player's total steps into
//! [`LevelHud`] every frame while the level is ready.
use bevy_ecs::prelude::*;

use crate::components::player::Player;
use crate::resources::hud::LevelHud;
use crate::resources::levelprogression::LevelProgression;

/// Fill `hud` from the progression and the players' step counters.
pub fn refresh_level_hud(
    hud: &mut LevelHud,
    progression: &LevelProgression,
    players: &Query<&Player>,
) {
    hud.level = progression.depth();
    hud.steps_left = progression.steps_left();
    hud.steps_taken = players.iter().map(|p| p.steps).sum();
}

pub fn update_level_hud(
    mut hud: ResMut<LevelHud>,
    progression: Res<LevelProgression>,
    players: Query<&Player>,
) {
    refresh_level_hud(&mut hud, &progression, &players);
}
