use bevy_ecs::prelude::Resource;

/// Discrete frame counter. One scheduling tick is one frame.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct FrameClock {
    pub frame_count: u64,
}
