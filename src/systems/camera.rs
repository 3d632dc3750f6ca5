use bevy_ecs::prelude::*;

use crate::components::interactable::Interactable;
use crate::components::mapposition::MapPosition;
use crate::components::player::Player;
use crate::resources::camera::CameraFrame;

/// Keep the camera centred on the (enabled) player.
pub fn camera_follow_player(
    mut camera: ResMut<CameraFrame>,
    players: Query<(&MapPosition, &Interactable), With<Player>>,
) {
    if let Some((position, _)) = players.iter().find(|(_, i)| i.is_enabled()) {
        camera.follow(position.x, position.y);
    }
}
