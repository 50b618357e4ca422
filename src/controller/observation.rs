//! Observation encoding for the decision policy.
//!
//! Builds the fixed-order feature vector the policy sees each tick. Values
//! that cannot be measured (no target, no weapon) are encoded as sentinels
//! rather than omitted, so the vector length never changes.

use std::fmt;

use crate::host::Readiness;
use crate::types::Vec3;

/// What perception reported about the target this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetReading {
    pub position: Vec3,
    /// Normalized health, `None` when the target exposes no health.
    pub health_fraction: Option<f64>,
}

/// Everything the builder reads. Borrowed snapshot; building has no side effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationInput {
    pub target: Option<TargetReading>,
    pub self_position: Vec3,
    pub self_health_fraction: f64,
    pub capability: Option<Readiness>,
}

/// Fixed-size feature vector.
///
/// Layout:
/// ```text
/// [distance, dir_x, dir_y, dir_z, target_health, self_health, weapon_ready, cooldown]
/// ```
///
/// Negative distance or target health means "no target" and must never be
/// read as a real measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    values: [f64; Observation::DIM],
}

impl Observation {
    /// Number of features.
    pub const DIM: usize = 8;

    /// Sentinel for distance and target health when no target is available.
    pub const NO_TARGET: f64 = -1.0;

    pub const DISTANCE: usize = 0;
    pub const DIRECTION: usize = 1;
    pub const TARGET_HEALTH: usize = 4;
    pub const SELF_HEALTH: usize = 5;
    pub const WEAPON_READY: usize = 6;
    pub const COOLDOWN: usize = 7;

    /// Wraps raw values, e.g. when replaying recorded observations.
    pub fn from_values(values: [f64; Observation::DIM]) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    /// Distance to the target, `None` for the sentinel.
    pub fn target_distance(&self) -> Option<f64> {
        let d = self.values[Self::DISTANCE];
        (d >= 0.0).then_some(d)
    }

    pub fn direction(&self) -> Vec3 {
        let i = Self::DIRECTION;
        Vec3::new(self.values[i], self.values[i + 1], self.values[i + 2])
    }

    /// Target health fraction, `None` for the sentinel.
    pub fn target_health(&self) -> Option<f64> {
        let h = self.values[Self::TARGET_HEALTH];
        (h >= 0.0).then_some(h)
    }

    pub fn has_target(&self) -> bool {
        self.target_distance().is_some()
    }

    pub fn self_health(&self) -> f64 {
        self.values[Self::SELF_HEALTH]
    }

    pub fn weapon_ready(&self) -> bool {
        self.values[Self::WEAPON_READY] > 0.5
    }

    pub fn cooldown_fraction(&self) -> f64 {
        self.values[Self::COOLDOWN]
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.3}", v)?;
        }
        write!(f, "]")
    }
}

/// Builds observation vectors.
pub struct ObservationBuilder;

impl ObservationBuilder {
    /// Builds the observation for one tick.
    ///
    /// A target is only reported when it was detected, exposes health, and
    /// that health is above zero; otherwise distance, direction and target
    /// health take their sentinel values. A missing capability reads as not
    /// ready with no cooldown.
    pub fn build(input: &ObservationInput) -> Observation {
        let mut values = [0.0; Observation::DIM];

        match Self::live_target(input.target) {
            Some((position, health)) => {
                let dir = input.self_position.direction_to(&position);
                values[Observation::DISTANCE] = input.self_position.distance_to(&position);
                values[Observation::DIRECTION] = dir.x;
                values[Observation::DIRECTION + 1] = dir.y;
                values[Observation::DIRECTION + 2] = dir.z;
                values[Observation::TARGET_HEALTH] = health;
            }
            None => {
                values[Observation::DISTANCE] = Observation::NO_TARGET;
                values[Observation::TARGET_HEALTH] = Observation::NO_TARGET;
            }
        }

        values[Observation::SELF_HEALTH] = input.self_health_fraction;

        if let Some(readiness) = input.capability {
            values[Observation::WEAPON_READY] = if readiness.is_ready { 1.0 } else { 0.0 };
            values[Observation::COOLDOWN] = readiness.cooldown_fraction.clamp(0.0, 1.0);
        }

        Observation { values }
    }

    fn live_target(target: Option<TargetReading>) -> Option<(Vec3, f64)> {
        let reading = target?;
        let health = reading.health_fraction?;
        (health > 0.0).then_some((reading.position, health))
    }
}
