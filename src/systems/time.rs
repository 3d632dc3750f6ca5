//! Frame counter update.
use bevy_ecs::prelude::*;

use crate::resources::frameclock::FrameClock;

/// Advance the [`FrameClock`] by one frame. Called by the main loop before
/// the schedule runs.
pub fn advance_frame_clock(world: &mut World) {
    let mut clock = world.resource_mut::<FrameClock>();
    clock.frame_count += 1;
}
