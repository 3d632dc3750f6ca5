//! Shared camera framing resource.
//!
//! The level pipeline does not render anything itself; it only tells the
//! camera collaborator how large the view must be for the current grid and
//! where to look.

use bevy_ecs::prelude::Resource;

use crate::resources::levelprogression::camera_ortho_size;

/// Camera distance behind the play plane.
pub const CAMERA_DEPTH: f32 = -10.0;

/// ECS resource holding the camera parameters derived from the active level.
///
/// `ortho_size` is refreshed whenever a new grid size is established;
/// `target` follows the player every frame.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub ortho_size: f32,
    pub target: (f32, f32, f32),
}

impl Default for CameraFrame {
    fn default() -> Self {
        Self {
            ortho_size: 1.0,
            target: (0.0, 0.0, CAMERA_DEPTH),
        }
    }
}

impl CameraFrame {
    /// Recompute the orthographic size for a grid of `width` x `height` tiles.
    pub fn frame_grid(&mut self, width: u32, height: u32) {
        self.ortho_size = camera_ortho_size(width, height);
    }

    /// Center the camera on a world position.
    pub fn follow(&mut self, x: f32, y: f32) {
        self.target = (x, y, CAMERA_DEPTH);
    }
}
