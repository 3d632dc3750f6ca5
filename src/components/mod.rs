//! ECS components for the scene actors touched by the level pipeline.
//!
//! Submodules overview:
//! - [`exit`] – tag for the level exit
//! - [`interactable`] – enable/disable switch for actors
//! - [`mapposition`] – world-space position of an actor, in tile units
//! - [`player`] – the controllable character and its step counter

pub mod exit;
pub mod interactable;
pub mod mapposition;
pub mod player;
