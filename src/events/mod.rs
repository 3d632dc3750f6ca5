//! Event types and observers used by the level pipeline.
//!
//! Events decouple the parts of the pipeline: the builder does not know about
//! population, and the movement collaborator does not know about the state
//! machine. Every external trigger goes through these observers.
//!
//! Submodules:
//! - [`levelstate`] – state transition requests and the observer applying them
//! - [`levelbuilt`] – aggregated build completion
//! - [`steps`] – player steps counted against the level budget
//! - [`exit`] – exit reached, descend one level
//! - [`reset`] – discard and rebuild the current level
pub mod exit;
pub mod levelbuilt;
pub mod levelstate;
pub mod reset;
pub mod steps;
