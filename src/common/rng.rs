//! Shared random source for gameplay rolls (batch direction, path choice, crab speed).

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Resource, Debug)]
pub struct ArcadeRng(pub StdRng);

impl ArcadeRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for ArcadeRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}
