//! Contracts for the engine-side collaborators of the controller.
//!
//! Each controller receives one implementation of every trait at
//! construction and owns it for its lifetime. Only
//! [`CapabilityProvider::current`] is expected to change identity between
//! ticks (the wielded weapon may be swapped), so it is re-queried every tick.

use std::fmt::Debug;

use crate::types::Vec3;

/// Target detection and spatial queries.
pub trait PerceptionSource {
    /// Opaque handle identifying a detected target.
    type Target: Copy + Eq + Debug;

    /// Runs detection for this tick. `None` means nothing is in sight.
    fn try_detect_target(&mut self) -> Option<Self::Target>;

    fn target_position(&self, target: Self::Target) -> Vec3;

    /// Normalized target health, or `None` if the target has no health
    /// component (treated the same as no target).
    fn target_health_fraction(&self, target: Self::Target) -> Option<f64>;

    /// World position of the controlled agent.
    fn self_position(&self) -> Vec3;
}

/// The controlled agent's own health.
pub trait VitalityProvider {
    fn self_health(&self) -> f64;

    fn self_max_health(&self) -> f64;

    /// Health normalized to `[0, 1]`; zero when max health is not positive.
    fn self_health_fraction(&self) -> f64 {
        let max = self.self_max_health();
        if max > 0.0 {
            (self.self_health() / max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Restores health and start position for a new episode.
    fn revive(&mut self);
}

/// One reading of the current capability (weapon).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readiness {
    pub is_ready: bool,
    /// Fraction of the cooldown still to run, in `[0, 1]`.
    pub cooldown_fraction: f64,
}

impl Readiness {
    pub fn ready() -> Self {
        Self {
            is_ready: true,
            cooldown_fraction: 0.0,
        }
    }

    pub fn cooling(cooldown_fraction: f64) -> Self {
        Self {
            is_ready: false,
            cooldown_fraction,
        }
    }
}

/// Capability readiness, re-fetched every tick.
pub trait CapabilityProvider {
    /// Reading for the currently equipped capability, `None` if there is none.
    fn current(&self) -> Option<Readiness>;

    /// Missing capability is never ready.
    fn is_ready(&self) -> bool {
        self.current().is_some_and(|r| r.is_ready)
    }
}

/// The engine-side state machine the controller commands.
pub trait StateTransitionExecutor {
    /// Fire-and-forget request to enter `state`.
    fn transition_to(&mut self, state: &str);
}

/// A provider for agents with no capability at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapability;

impl CapabilityProvider for NoCapability {
    fn current(&self) -> Option<Readiness> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedVitals {
        health: f64,
        max: f64,
    }

    impl VitalityProvider for FixedVitals {
        fn self_health(&self) -> f64 {
            self.health
        }
        fn self_max_health(&self) -> f64 {
            self.max
        }
        fn revive(&mut self) {
            self.health = self.max;
        }
    }

    #[test]
    fn health_fraction_normalizes() {
        let v = FixedVitals {
            health: 25.0,
            max: 100.0,
        };
        assert!((v.self_health_fraction() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn health_fraction_zero_max() {
        let v = FixedVitals {
            health: 5.0,
            max: 0.0,
        };
        assert_eq!(v.self_health_fraction(), 0.0);
    }

    #[test]
    fn health_fraction_clamps_negative() {
        let v = FixedVitals {
            health: -10.0,
            max: 100.0,
        };
        assert_eq!(v.self_health_fraction(), 0.0);
    }

    #[test]
    fn missing_capability_is_never_ready() {
        assert!(!NoCapability.is_ready());
        assert_eq!(NoCapability.current(), None);
    }
}
