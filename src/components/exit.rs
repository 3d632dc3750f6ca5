use bevy_ecs::prelude::Component;

/// Tag component for the level exit.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Exit;
