//! Rule-based melee policy.
//!
//! Mirrors manual control of a melee agent: look for a target, close in,
//! and strike once in reach with a ready weapon.

use super::trait_::Policy;
use crate::controller::{LegalActions, Observation};
use crate::types::ActionId;

/// Greedy melee behavior over the observation vector.
///
/// - Target in attack range and attack legal: attack.
/// - Target visible: move toward it.
/// - Otherwise: detect.
///
/// Falls back to the first legal action when the preferred one is not legal
/// (for instance the neutral action while an attack is locked).
pub struct HeuristicPolicy {
    detect: ActionId,
    approach: ActionId,
    attack: ActionId,
    attack_range: f64,
}

impl HeuristicPolicy {
    pub fn new(detect: ActionId, approach: ActionId, attack: ActionId, attack_range: f64) -> Self {
        Self {
            detect,
            approach,
            attack,
            attack_range,
        }
    }

    /// Ids and range of the default melee action table.
    pub fn melee() -> Self {
        Self::new(0, 1, 2, 2.0)
    }

    fn preferred(&self, observation: &Observation) -> ActionId {
        match observation.target_distance() {
            Some(d) if d <= self.attack_range && observation.weapon_ready() => self.attack,
            Some(_) => self.approach,
            None => self.detect,
        }
    }
}

impl Policy for HeuristicPolicy {
    fn select_action(&mut self, observation: &Observation, legal: &LegalActions) -> ActionId {
        let preferred = self.preferred(observation);
        if legal.contains(preferred) {
            preferred
        } else {
            legal.first().unwrap_or(preferred)
        }
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(distance: f64, ready: bool) -> Observation {
        let health = if distance < 0.0 { -1.0 } else { 1.0 };
        let ready = if ready { 1.0 } else { 0.0 };
        Observation::from_values([distance, 1.0, 0.0, 0.0, health, 1.0, ready, 0.0])
    }

    #[test]
    fn detects_without_target() {
        let mut p = HeuristicPolicy::melee();
        assert_eq!(p.select_action(&obs(-1.0, true), &LegalActions::all(3)), 0);
    }

    #[test]
    fn approaches_distant_target() {
        let mut p = HeuristicPolicy::melee();
        assert_eq!(p.select_action(&obs(5.0, true), &LegalActions::all(3)), 1);
    }

    #[test]
    fn attacks_in_range_when_ready() {
        let mut p = HeuristicPolicy::melee();
        assert_eq!(p.select_action(&obs(1.5, true), &LegalActions::all(3)), 2);
    }

    #[test]
    fn approaches_in_range_when_not_ready() {
        let mut p = HeuristicPolicy::melee();
        let legal = LegalActions::from_mask(vec![true, true, false]);
        assert_eq!(p.select_action(&obs(1.5, false), &legal), 1);
    }

    #[test]
    fn falls_back_to_configured_neutral() {
        let mut p = HeuristicPolicy::melee();
        let legal = LegalActions::from_mask(vec![false, true, false]);
        assert_eq!(p.select_action(&obs(-1.0, true), &legal), 1);
    }

    #[test]
    fn empty_set_keeps_preference() {
        let mut p = HeuristicPolicy::melee();
        let legal = LegalActions::from_mask(vec![false, false, false]);
        assert_eq!(p.select_action(&obs(5.0, true), &legal), 1);
    }

    #[test]
    fn falls_back_to_neutral_while_locked() {
        let mut p = HeuristicPolicy::melee();
        let legal = LegalActions::from_mask(vec![true, false, false]);
        assert_eq!(p.select_action(&obs(1.5, true), &legal), 0);
    }
}
