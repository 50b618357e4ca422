//! Core value types shared across the controller.
//!
//! Defines world-space vectors, action identifiers, and the per-tick
//! episode outcome.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dense action identifier, `0..N` over the configured action table.
pub type ActionId = usize;

/// A position or direction in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Creates a new vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Vec3) -> f64 {
        (*other - *self).length()
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Returns the unit direction vector from `self` toward `target`.
    ///
    /// Returns the zero vector if the points are coincident.
    pub fn direction_to(&self, target: &Vec3) -> Vec3 {
        let delta = *target - *self;
        let dist = delta.length();
        if dist < 1e-12 {
            Vec3::zero()
        } else {
            Vec3::new(delta.x / dist, delta.y / dist, delta.z / dist)
        }
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Terminal signal computed fresh every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EpisodeOutcome {
    #[default]
    Ongoing,
    SelfDefeated,
    TargetDefeated,
}

impl EpisodeOutcome {
    /// Returns true if this outcome ends the episode.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EpisodeOutcome::Ongoing)
    }
}

impl fmt::Display for EpisodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeOutcome::Ongoing => write!(f, "ongoing"),
            EpisodeOutcome::SelfDefeated => write!(f, "self_defeated"),
            EpisodeOutcome::TargetDefeated => write!(f, "target_defeated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_3d() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(2.0, 3.0, 6.0);
        assert!((a.distance_to(&b) - 7.0).abs() < 1e-10);
    }

    #[test]
    fn direction_is_unit_length() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        let b = Vec3::new(4.0, 5.0, 1.0);
        let d = a.direction_to(&b);
        assert!((d.length() - 1.0).abs() < 1e-10);
        assert!((d.x - 0.6).abs() < 1e-10);
        assert!((d.y - 0.8).abs() < 1e-10);
    }

    #[test]
    fn direction_coincident_is_zero() {
        let a = Vec3::new(3.0, 3.0, 3.0);
        assert_eq!(a.direction_to(&a), Vec3::zero());
    }

    #[test]
    fn only_ongoing_is_non_terminal() {
        assert!(!EpisodeOutcome::Ongoing.is_terminal());
        assert!(EpisodeOutcome::SelfDefeated.is_terminal());
        assert!(EpisodeOutcome::TargetDefeated.is_terminal());
    }

    #[test]
    fn outcome_display() {
        assert_eq!(EpisodeOutcome::TargetDefeated.to_string(), "target_defeated");
    }
}
