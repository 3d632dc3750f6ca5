//! Dungeon Stager library.
//!
//! Exposes the level pipeline's ECS components, resources, stages, systems
//! and events for the binary and for integration tests.

pub mod components;
pub mod events;
pub mod game;
pub mod resources;
pub mod stages;
pub mod systems;
