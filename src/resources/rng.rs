//! Seeded random source for population decisions.

use bevy_ecs::prelude::Resource;
use fastrand::Rng;

#[derive(Resource, Debug)]
pub struct LevelRng(pub Rng);

impl LevelRng {
    /// `seed == 0` draws a random seed.
    pub fn new(seed: u64) -> Self {
        if seed == 0 {
            LevelRng(Rng::new())
        } else {
            LevelRng(Rng::with_seed(seed))
        }
    }
}
