//! Per-tick legal action computation.

use std::fmt;

use super::lock::LockState;
use crate::actions::ActionTable;
use crate::types::ActionId;

/// Mask over the action table: `mask[id]` is true when `id` may be chosen.
///
/// Never empty when produced by [`ActionGate::legal_actions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalActions {
    mask: Vec<bool>,
}

impl LegalActions {
    /// Builds a mask directly, e.g. for policy tests.
    pub fn from_mask(mask: Vec<bool>) -> Self {
        Self { mask }
    }

    /// Every action in a table of `len` actions is legal.
    pub fn all(len: usize) -> Self {
        Self {
            mask: vec![true; len],
        }
    }

    /// Out-of-range ids are never legal.
    pub fn contains(&self, id: ActionId) -> bool {
        self.mask.get(id).copied().unwrap_or(false)
    }

    pub fn ids(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(id, legal)| legal.then_some(id))
    }

    pub fn first(&self) -> Option<ActionId> {
        self.ids().next()
    }

    pub fn count(&self) -> usize {
        self.mask.iter().filter(|legal| **legal).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn as_mask(&self) -> &[bool] {
        &self.mask
    }
}

impl fmt::Display for LegalActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.ids().map(|id| id.to_string()).collect();
        write!(f, "{{{}}}", ids.join(", "))
    }
}

/// Computes the legal action set for the current tick.
pub struct ActionGate;

impl ActionGate {
    /// Returns the actions a policy may choose from this tick.
    ///
    /// - Locked: only the neutral action.
    /// - Unlocked: every action except those that need the capability while
    ///   it is not ready.
    ///
    /// Must be recomputed every tick; readiness can change between ticks.
    pub fn legal_actions(
        table: &ActionTable,
        lock: &LockState,
        capability_ready: bool,
    ) -> LegalActions {
        let neutral = table.neutral();
        let mask = table
            .iter()
            .map(|descriptor| {
                if lock.is_locked() {
                    descriptor.id() == neutral
                } else {
                    capability_ready || !descriptor.requires_capability_ready()
                }
            })
            .collect();
        LegalActions { mask }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::secs;

    #[test]
    fn unlocked_and_ready_allows_everything() {
        let table = ActionTable::melee();
        let legal = ActionGate::legal_actions(&table, &LockState::default(), true);
        assert_eq!(legal.ids().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn unready_capability_excludes_gated_actions() {
        let table = ActionTable::melee();
        let legal = ActionGate::legal_actions(&table, &LockState::default(), false);
        assert_eq!(legal.ids().collect::<Vec<_>>(), vec![0, 1]);
        assert!(!legal.contains(2));
    }

    #[test]
    fn locked_allows_only_neutral() {
        let table = ActionTable::melee();
        let lock = LockState::locked(2, secs(0.3));
        for ready in [true, false] {
            let legal = ActionGate::legal_actions(&table, &lock, ready);
            assert_eq!(legal.ids().collect::<Vec<_>>(), vec![0]);
        }
    }

    #[test]
    fn never_empty() {
        let table = ActionTable::melee();
        let lock = LockState::locked(2, secs(0.3));
        assert!(!ActionGate::legal_actions(&table, &lock, false).is_empty());
        assert!(!ActionGate::legal_actions(&table, &LockState::default(), false).is_empty());
    }

    #[test]
    fn out_of_range_id_not_contained() {
        let legal = LegalActions::all(3);
        assert!(!legal.contains(99));
    }

    #[test]
    fn display_lists_ids() {
        assert_eq!(
            LegalActions::from_mask(vec![true, false, true]).to_string(),
            "{0, 2}"
        );
    }
}
