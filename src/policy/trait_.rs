//! Policy trait for the decision controller.

use crate::controller::{LegalActions, Observation};
use crate::types::ActionId;

/// Chooses one action id per tick.
///
/// Policies receive the tick's [`Observation`] and the gate's
/// [`LegalActions`]. Well-behaved policies pick from the legal set; the
/// controller treats anything else as a wasted, no-op decision.
pub trait Policy: Send + Sync {
    /// Selects the action for this tick.
    fn select_action(&mut self, observation: &Observation, legal: &LegalActions) -> ActionId;

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;
}
