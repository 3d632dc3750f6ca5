//! Level pipeline systems.
//!
//! Submodules overview
//! - [`camera`] – keep the camera on the player
//! - [`hud`] – refresh the HUD values
//! - [`levelbuilder`] – tick the builder in per-tick mode
//! - [`levelstate`] – pending transition check and state run conditions
//! - [`population`] – player/exit placement and the population pass
//! - [`steps`] – reset the level when its step budget runs out
//! - [`time`] – advance the frame counter

pub mod camera;
pub mod hud;
pub mod levelbuilder;
pub mod levelstate;
pub mod population;
pub mod steps;
pub mod time;
