//! Random policy for testing and baselines.

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;

use super::trait_::Policy;
use crate::controller::{LegalActions, Observation};
use crate::types::ActionId;

/// Uniformly random choice over the legal set.
///
/// Seeded, so evaluation runs are reproducible.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn select_action(&mut self, _observation: &Observation, legal: &LegalActions) -> ActionId {
        // Empty only for hand-built masks, where any id is rejected anyway.
        legal.ids().choose(&mut self.rng).unwrap_or_default()
    }

    fn name(&self) -> &str {
        "random"
    }
}
