//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems and observers during execution. Each submodule
//! documents the semantics and intended usage of its resource(s).
//!
//! Overview
//! - `camera` – orthographic size and target derived from the level
//! - `dungeonconfig` – INI-backed pipeline configuration
//! - `frameclock` – discrete frame counter
//! - `hud` – values shown by the HUD collaborator
//! - `levelbuilder` – build scheduler for level stages
//! - `leveldata` – tile grid, rooms and the outputs of every stage
//! - `levelprogression` – depth, level record stack and step budgets
//! - `levelstate` – authoritative and pending level state
//! - `rng` – seeded random source for population
//! - `systemsstore` – registry of state enter hooks
pub mod camera;
pub mod dungeonconfig;
pub mod frameclock;
pub mod hud;
pub mod levelbuilder;
pub mod leveldata;
pub mod levelprogression;
pub mod levelstate;
pub mod rng;
pub mod systemsstore;
