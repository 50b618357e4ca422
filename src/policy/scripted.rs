//! Fixed-script policy for manual and test control.

use std::collections::VecDeque;

use super::trait_::Policy;
use crate::controller::{LegalActions, Observation};
use crate::types::ActionId;

/// Replays a fixed list of action ids, then repeats `fallback` forever.
///
/// The legal set is deliberately ignored: a script says exactly what is
/// submitted, which is how gate and scheduler rejections are exercised.
pub struct ScriptedPolicy {
    script: VecDeque<ActionId>,
    fallback: ActionId,
}

impl ScriptedPolicy {
    pub fn new(script: impl IntoIterator<Item = ActionId>, fallback: ActionId) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
        }
    }

    /// Always chooses `action`.
    pub fn constant(action: ActionId) -> Self {
        Self::new(std::iter::empty(), action)
    }

    /// Queues more actions after the current script.
    pub fn push(&mut self, action: ActionId) {
        self.script.push_back(action);
    }

    /// Actions still queued before the fallback kicks in.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Policy for ScriptedPolicy {
    fn select_action(&mut self, _observation: &Observation, _legal: &LegalActions) -> ActionId {
        self.script.pop_front().unwrap_or(self.fallback)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
