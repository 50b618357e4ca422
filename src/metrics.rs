//! Episode statistics and policy evaluation.
//!
//! Tracks per-episode figures from [`StepResult`]s and aggregates them over
//! multiple evaluation episodes.

use std::fmt;

use crate::controller::{AgentController, Decision, StepResult};
use crate::host::{CapabilityProvider, PerceptionSource, StateTransitionExecutor, VitalityProvider};
use crate::policy::Policy;
use crate::types::EpisodeOutcome;

/// Host-side consumer of episode boundaries and per-tick results.
///
/// Attach to a controller with
/// [`AgentController::add_listener`](crate::controller::AgentController::add_listener).
pub trait EpisodeListener {
    /// Called once the controller has reset for a new episode.
    fn on_episode_begin(&mut self) {}

    /// Called for every applied tick, including the one that ends an episode.
    fn on_step_result(&mut self, result: &StepResult);
}

/// Running figures for one episode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeStats {
    pub ticks: u32,
    pub cumulative_reward: f64,
    /// Invalid, illegal, out-of-range and stale choices.
    pub wasted_decisions: u32,
    pub locks_started: u32,
    pub outcome: EpisodeOutcome,
    /// Ended by a tick horizon rather than a terminal outcome.
    pub truncated: bool,
}

impl EpisodeStats {
    /// True once a terminal outcome or truncation was recorded.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_terminal() || self.truncated
    }
}

impl EpisodeListener for EpisodeStats {
    fn on_episode_begin(&mut self) {
        *self = Self::default();
    }

    fn on_step_result(&mut self, result: &StepResult) {
        if self.is_finished() {
            return;
        }
        self.ticks += 1;
        self.cumulative_reward += result.reward;
        if result.decision.is_wasted() {
            self.wasted_decisions += 1;
        }
        if matches!(result.decision, Decision::Locked { .. }) {
            self.locks_started += 1;
        }
        self.outcome = result.outcome;
        self.truncated = result.truncated;
    }
}

/// Aggregated evaluation metrics over multiple episodes.
#[derive(Debug, Clone)]
pub struct EvaluationMetrics {
    /// Fraction of episodes ending in [`EpisodeOutcome::TargetDefeated`].
    pub win_rate: f64,
    /// Fraction of episodes ending in [`EpisodeOutcome::SelfDefeated`].
    pub loss_rate: f64,
    /// Fraction of episodes cut off by a horizon.
    pub truncation_rate: f64,
    pub mean_cumulative_reward: f64,
    /// Mean episode length in ticks.
    pub mean_ticks: f64,
    pub mean_wasted_decisions: f64,
    pub mean_locks_started: f64,
    pub n_episodes: usize,
}

impl EvaluationMetrics {
    /// Runs `n_episodes` episodes of `policy` on `controller`.
    ///
    /// An episode ends on a terminal outcome, on the controller's own
    /// horizon, or after `tick_limit` ticks (counted as truncated).
    /// `between_ticks` is called with the tick duration after every tick
    /// so the host world can advance.
    pub fn evaluate<P, V, C, X>(
        controller: &mut AgentController<P, V, C, X>,
        policy: &mut dyn Policy,
        n_episodes: usize,
        tick_limit: u32,
        mut between_ticks: impl FnMut(f64),
    ) -> Self
    where
        P: PerceptionSource,
        V: VitalityProvider,
        C: CapabilityProvider,
        X: StateTransitionExecutor,
    {
        let dt = controller.config().tick_secs;
        let mut all_stats = Vec::with_capacity(n_episodes);
        // The controller restarts itself after a finished episode.
        let mut fresh = false;

        for _ in 0..n_episodes {
            if !fresh {
                controller.on_episode_begin();
            }
            let mut stats = EpisodeStats::default();

            while !stats.is_finished() && stats.ticks < tick_limit {
                let result = controller.step(policy);
                stats.on_step_result(&result);
                between_ticks(dt);
            }
            fresh = stats.is_finished();
            if !fresh {
                stats.truncated = true;
            }

            all_stats.push(stats);
        }

        Self::aggregate(&all_stats)
    }

    /// Aggregates already collected episodes.
    pub fn aggregate(all_stats: &[EpisodeStats]) -> Self {
        let n_episodes = all_stats.len();
        if n_episodes == 0 {
            return Self {
                win_rate: 0.0,
                loss_rate: 0.0,
                truncation_rate: 0.0,
                mean_cumulative_reward: 0.0,
                mean_ticks: 0.0,
                mean_wasted_decisions: 0.0,
                mean_locks_started: 0.0,
                n_episodes,
            };
        }

        let n = n_episodes as f64;
        let rate = |outcome: EpisodeOutcome| {
            all_stats.iter().filter(|s| s.outcome == outcome).count() as f64 / n
        };
        let mean = |f: fn(&EpisodeStats) -> f64| all_stats.iter().map(f).sum::<f64>() / n;

        Self {
            win_rate: rate(EpisodeOutcome::TargetDefeated),
            loss_rate: rate(EpisodeOutcome::SelfDefeated),
            truncation_rate: all_stats.iter().filter(|s| s.truncated).count() as f64 / n,
            mean_cumulative_reward: mean(|s| s.cumulative_reward),
            mean_ticks: mean(|s| s.ticks as f64),
            mean_wasted_decisions: mean(|s| s.wasted_decisions as f64),
            mean_locks_started: mean(|s| s.locks_started as f64),
            n_episodes,
        }
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Evaluation Metrics ({} episodes) ===",
            self.n_episodes
        )?;
        writeln!(f, "  Win rate:                {:.1}%", self.win_rate * 100.0)?;
        writeln!(f, "  Loss rate:               {:.1}%", self.loss_rate * 100.0)?;
        writeln!(
            f,
            "  Truncated:               {:.1}%",
            self.truncation_rate * 100.0
        )?;
        writeln!(f, "  Mean episode ticks:      {:.1}", self.mean_ticks)?;
        writeln!(
            f,
            "  Mean wasted decisions:   {:.1}",
            self.mean_wasted_decisions
        )?;
        writeln!(f, "  Mean locks started:      {:.1}", self.mean_locks_started)?;
        writeln!(
            f,
            "  Mean cumulative reward:  {:.3}",
            self.mean_cumulative_reward
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::controller::{LegalActions, Observation};
    use crate::host::{DuelArena, DuelSettings};
    use crate::policy::{HeuristicPolicy, ScriptedPolicy};

    fn result(decision: Decision, reward: f64, outcome: EpisodeOutcome) -> StepResult {
        StepResult {
            observation: Observation::from_values([0.0; Observation::DIM]),
            legal: LegalActions::all(3),
            decision,
            reward,
            outcome,
            truncated: false,
            released: None,
            tick: 1,
            episode_tick: 1,
            episode: 1,
        }
    }

    #[test]
    fn stats_accumulate_until_finished() {
        let mut stats = EpisodeStats::default();
        stats.on_step_result(&result(
            Decision::Illegal { action: 2 },
            -0.001,
            EpisodeOutcome::Ongoing,
        ));
        stats.on_step_result(&result(
            Decision::Discarded {
                requested: 1,
                locked_by: 2,
            },
            0.5,
            EpisodeOutcome::Ongoing,
        ));
        stats.on_step_result(&result(
            Decision::Instant { action: 0 },
            1.5,
            EpisodeOutcome::TargetDefeated,
        ));
        stats.on_step_result(&result(
            Decision::Instant { action: 0 },
            -0.001,
            EpisodeOutcome::Ongoing,
        ));

        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.wasted_decisions, 1);
        assert!((stats.cumulative_reward - 1.999).abs() < 1e-12);
        assert_eq!(stats.outcome, EpisodeOutcome::TargetDefeated);
        assert!(stats.is_finished());
    }

    #[test]
    fn aggregate_rates() {
        let stats = vec![
            EpisodeStats {
                ticks: 10,
                outcome: EpisodeOutcome::TargetDefeated,
                cumulative_reward: 2.0,
                ..Default::default()
            },
            EpisodeStats {
                ticks: 30,
                outcome: EpisodeOutcome::SelfDefeated,
                cumulative_reward: -1.0,
                ..Default::default()
            },
            EpisodeStats {
                ticks: 20,
                truncated: true,
                ..Default::default()
            },
            EpisodeStats {
                ticks: 20,
                outcome: EpisodeOutcome::TargetDefeated,
                cumulative_reward: 3.0,
                ..Default::default()
            },
        ];
        let m = EvaluationMetrics::aggregate(&stats);
        assert_eq!(m.n_episodes, 4);
        assert_eq!(m.win_rate, 0.5);
        assert_eq!(m.loss_rate, 0.25);
        assert_eq!(m.truncation_rate, 0.25);
        assert_eq!(m.mean_ticks, 20.0);
        assert_eq!(m.mean_cumulative_reward, 1.0);
    }

    #[test]
    fn aggregate_empty() {
        let m = EvaluationMetrics::aggregate(&[]);
        assert_eq!(m.n_episodes, 0);
        assert_eq!(m.win_rate, 0.0);
    }

    #[test]
    fn evaluate_heuristic_in_duel() {
        let arena = DuelArena::new(DuelSettings::default());
        let (perception, vitals, weapon, executor) = arena.bindings();
        let mut controller =
            AgentController::new(ControllerConfig::default(), perception, vitals, weapon, executor)
                .unwrap();
        let mut policy = HeuristicPolicy::melee();

        let metrics =
            EvaluationMetrics::evaluate(&mut controller, &mut policy, 3, 2000, |dt| {
                arena.advance(dt)
            });

        assert_eq!(metrics.n_episodes, 3);
        assert_eq!(metrics.win_rate, 1.0);
        assert!(metrics.mean_locks_started >= 4.0);
        assert!(metrics.mean_cumulative_reward > 0.0);
        assert_eq!(controller.episode(), 4);
    }

    #[test]
    fn evaluate_counts_tick_limit_as_truncation() {
        let arena = DuelArena::new(DuelSettings::default());
        let (perception, vitals, weapon, executor) = arena.bindings();
        let mut controller =
            AgentController::new(ControllerConfig::default(), perception, vitals, weapon, executor)
                .unwrap();
        let mut idle = ScriptedPolicy::constant(0);

        let metrics = EvaluationMetrics::evaluate(&mut controller, &mut idle, 2, 5, |dt| {
            arena.advance(dt)
        });

        assert_eq!(metrics.truncation_rate, 1.0);
        assert_eq!(metrics.mean_ticks, 5.0);
        assert_eq!(metrics.win_rate, 0.0);
    }

    #[test]
    fn display_includes_rates() {
        let m = EvaluationMetrics::aggregate(&[EpisodeStats {
            outcome: EpisodeOutcome::TargetDefeated,
            ..Default::default()
        }]);
        let text = m.to_string();
        assert!(text.contains("1 episodes"));
        assert!(text.contains("Win rate:                100.0%"));
    }
}
