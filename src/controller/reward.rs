//! Health-delta reward shaping and terminal detection.
//!
//! Rules are evaluated in a fixed order, self before target:
//!
//! 1. **Damage taken**: `take_damage_penalty` when own health dropped.
//! 2. **Defeat**: `agent_died_penalty` when own health is `<= 0`; ends the tick.
//! 3. **Damage dealt**: `deal_damage_reward` when target health dropped.
//! 4. **Kill**: `kill_target_reward` when target health is `<= 0`; ends the tick.
//! 5. **Time**: `time_penalty` on every tick that did not end in 2 or 4.
//!
//! A tick on which both sides fall therefore scores as a defeat only.

use crate::config::RewardConfig;
use crate::types::EpisodeOutcome;

/// Own and target health for the current and the previous tick.
///
/// Target health is a normalized fraction; own health is absolute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalitySnapshot {
    pub self_health: f64,
    pub previous_self_health: f64,
    pub target_health: Option<f64>,
    pub previous_target_health: f64,
}

impl VitalitySnapshot {
    /// Baseline at episode start: own health at max, target health at full
    /// (normalized 1.0) when a target is known, else 0.
    pub fn at_episode_start(self_max_health: f64, has_target: bool) -> Self {
        let target_baseline = if has_target { 1.0 } else { 0.0 };
        Self {
            self_health: self_max_health,
            previous_self_health: self_max_health,
            target_health: has_target.then_some(target_baseline),
            previous_target_health: target_baseline,
        }
    }

    /// Records this tick's readings; previous values are untouched.
    pub fn observe(&mut self, self_health: f64, target_health: Option<f64>) {
        self.self_health = self_health;
        self.target_health = target_health;
    }

    /// Rolls current readings into the previous slots. Target history only
    /// moves while a target is present.
    pub fn commit(&mut self) {
        self.previous_self_health = self.self_health;
        if let Some(target) = self.target_health {
            self.previous_target_health = target;
        }
    }

    /// Re-baselines target history, e.g. when a different target is acquired.
    pub fn rebase_target(&mut self, target_health: f64) {
        self.previous_target_health = target_health;
    }
}

/// Reward and outcome for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardSignal {
    pub reward: f64,
    pub outcome: EpisodeOutcome,
}

/// Computes per-tick rewards from health deltas.
#[derive(Debug, Clone)]
pub struct RewardShaper {
    config: RewardConfig,
}

impl RewardShaper {
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Scores a snapshot without modifying it.
    pub fn score(&self, snapshot: &VitalitySnapshot) -> RewardSignal {
        let cfg = &self.config;
        let mut reward = 0.0;

        if snapshot.self_health < snapshot.previous_self_health {
            reward += cfg.take_damage_penalty;
        }
        if snapshot.self_health <= 0.0 {
            reward += cfg.agent_died_penalty;
            return RewardSignal {
                reward,
                outcome: EpisodeOutcome::SelfDefeated,
            };
        }

        if let Some(target) = snapshot.target_health {
            if target < snapshot.previous_target_health {
                reward += cfg.deal_damage_reward;
            }
            if target <= 0.0 {
                reward += cfg.kill_target_reward;
                return RewardSignal {
                    reward,
                    outcome: EpisodeOutcome::TargetDefeated,
                };
            }
        }

        reward += cfg.time_penalty;
        RewardSignal {
            reward,
            outcome: EpisodeOutcome::Ongoing,
        }
    }

    /// Records this tick's health, scores it, and commits the readings as
    /// the new baseline unless the episode ends.
    pub fn evaluate(
        &self,
        snapshot: &mut VitalitySnapshot,
        self_health: f64,
        target_health: Option<f64>,
    ) -> RewardSignal {
        snapshot.observe(self_health, target_health);
        let signal = self.score(snapshot);
        if !signal.outcome.is_terminal() {
            snapshot.commit();
        }
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shaper() -> RewardShaper {
        RewardShaper::new(RewardConfig::default())
    }

    fn start() -> VitalitySnapshot {
        VitalitySnapshot::at_episode_start(100.0, true)
    }

    #[test]
    fn quiet_tick_costs_time_penalty() {
        let mut snap = start();
        let signal = shaper().evaluate(&mut snap, 100.0, Some(1.0));
        assert_eq!(signal.outcome, EpisodeOutcome::Ongoing);
        assert!((signal.reward - -0.001).abs() < 1e-12);
    }

    #[test]
    fn taking_damage_is_penalized() {
        let mut snap = start();
        let signal = shaper().evaluate(&mut snap, 80.0, Some(1.0));
        assert!((signal.reward - (-0.5 - 0.001)).abs() < 1e-12);
        assert_eq!(snap.previous_self_health, 80.0);
    }

    #[test]
    fn dealing_damage_is_rewarded() {
        let mut snap = start();
        let signal = shaper().evaluate(&mut snap, 100.0, Some(0.75));
        assert!((signal.reward - (0.5 - 0.001)).abs() < 1e-12);
        assert_eq!(snap.previous_target_health, 0.75);
    }

    #[test]
    fn self_defeat_ends_without_time_penalty() {
        let mut snap = start();
        let signal = shaper().evaluate(&mut snap, 0.0, Some(1.0));
        assert_eq!(signal.outcome, EpisodeOutcome::SelfDefeated);
        assert!((signal.reward - (-0.5 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn kill_ends_without_time_penalty() {
        let mut snap = start();
        let signal = shaper().evaluate(&mut snap, 100.0, Some(0.0));
        assert_eq!(signal.outcome, EpisodeOutcome::TargetDefeated);
        assert!((signal.reward - (0.5 + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn mutual_defeat_scores_self_defeat_only() {
        let mut snap = start();
        let signal = shaper().evaluate(&mut snap, 0.0, Some(0.0));
        assert_eq!(signal.outcome, EpisodeOutcome::SelfDefeated);
        assert!((signal.reward - (-0.5 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn terminal_tick_does_not_commit() {
        let mut snap = start();
        shaper().evaluate(&mut snap, 0.0, Some(0.5));
        assert_eq!(snap.previous_self_health, 100.0);
        assert_eq!(snap.previous_target_health, 1.0);
    }

    #[test]
    fn missing_target_keeps_target_history() {
        let mut snap = start();
        shaper().evaluate(&mut snap, 100.0, Some(0.6));
        let signal = shaper().evaluate(&mut snap, 100.0, None);
        assert_eq!(signal.outcome, EpisodeOutcome::Ongoing);
        assert!((signal.reward - -0.001).abs() < 1e-12);
        assert_eq!(snap.previous_target_health, 0.6);
    }

    #[test]
    fn no_target_at_start_has_zero_baseline() {
        let snap = VitalitySnapshot::at_episode_start(50.0, false);
        assert_eq!(snap.previous_target_health, 0.0);
        assert_eq!(snap.target_health, None);
        assert_eq!(snap.previous_self_health, 50.0);
    }

    #[test]
    fn score_is_pure() {
        let snap = VitalitySnapshot {
            self_health: 90.0,
            previous_self_health: 100.0,
            target_health: Some(0.5),
            previous_target_health: 0.7,
        };
        let before = snap;
        let signal = shaper().score(&snap);
        assert_eq!(snap, before);
        assert!((signal.reward - (-0.5 + 0.5 - 0.001)).abs() < 1e-12);
    }

    #[test]
    fn custom_weights() {
        let shaper = RewardShaper::new(RewardConfig {
            time_penalty: 0.0,
            deal_damage_reward: 2.0,
            ..RewardConfig::default()
        });
        let mut snap = start();
        let signal = shaper.evaluate(&mut snap, 100.0, Some(0.9));
        assert_eq!(signal.reward, 2.0);
    }
}
