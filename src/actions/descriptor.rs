//! Immutable per-action configuration.

use std::fmt;

use super::error::ConfigError;
use crate::config::{ActionSpec, ControllerConfig};
use crate::types::ActionId;
use crate::units::{secs, Seconds};

/// Static description of one discrete action.
///
/// Descriptors are immutable once their [`ActionTable`] is built. Runtime
/// lock timing lives in [`LockState`](crate::controller::LockState), never here.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDescriptor {
    id: ActionId,
    target_state: String,
    lock_duration: Seconds,
    requires_capability_ready: bool,
    max_target_distance: Option<f64>,
}

impl ActionDescriptor {
    /// Creates a descriptor. Values are checked when the table is built.
    pub fn new(
        id: ActionId,
        target_state: impl Into<String>,
        lock_duration: Seconds,
        requires_capability_ready: bool,
    ) -> Self {
        Self {
            id,
            target_state: target_state.into(),
            lock_duration,
            requires_capability_ready,
            max_target_distance: None,
        }
    }

    /// Restricts the action to a detected target at most `distance` away.
    pub fn with_max_target_distance(mut self, distance: f64) -> Self {
        self.max_target_distance = Some(distance);
        self
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    /// Label handed to the state-transition executor.
    pub fn target_state(&self) -> &str {
        &self.target_state
    }

    pub fn lock_duration(&self) -> Seconds {
        self.lock_duration
    }

    /// True if starting this action begins a lock.
    pub fn is_locking(&self) -> bool {
        self.lock_duration.value() > 0.0
    }

    pub fn requires_capability_ready(&self) -> bool {
        self.requires_capability_ready
    }

    pub fn max_target_distance(&self) -> Option<f64> {
        self.max_target_distance
    }

    /// Returns true if a target at `distance` (or no target) satisfies the
    /// range precondition.
    pub fn range_satisfied(&self, distance: Option<f64>) -> bool {
        match (self.max_target_distance, distance) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(max), Some(d)) => d <= max,
        }
    }

    fn validate(&self, position: usize) -> Result<(), ConfigError> {
        if self.id != position {
            return Err(ConfigError::NonDenseId {
                position,
                id: self.id,
            });
        }
        let lock = self.lock_duration.value();
        if !(lock.is_finite() && lock >= 0.0) {
            return Err(ConfigError::InvalidLockDuration {
                id: self.id,
                secs: lock,
            });
        }
        if let Some(distance) = self.max_target_distance {
            if !(distance.is_finite() && distance >= 0.0) {
                return Err(ConfigError::InvalidTargetDistance {
                    id: self.id,
                    distance,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.target_state)?;
        if self.is_locking() {
            write!(f, " (lock {:.3}s)", self.lock_duration.value())?;
        }
        Ok(())
    }
}

/// Validated, read-only table of action descriptors indexed by id.
///
/// # Invariants
///
/// - Non-empty, ids dense `0..len` in order.
/// - Every lock duration is finite and `>= 0`.
/// - The neutral action exists and needs neither capability nor a target,
///   so the legal set offered to a policy is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTable {
    descriptors: Vec<ActionDescriptor>,
    neutral: ActionId,
}

impl ActionTable {
    /// Validates and builds a table.
    pub fn new(descriptors: Vec<ActionDescriptor>, neutral: ActionId) -> Result<Self, ConfigError> {
        if descriptors.is_empty() {
            return Err(ConfigError::EmptyActionTable);
        }
        for (position, descriptor) in descriptors.iter().enumerate() {
            descriptor.validate(position)?;
        }
        let neutral_descriptor =
            descriptors
                .get(neutral)
                .ok_or(ConfigError::NeutralOutOfRange {
                    neutral,
                    len: descriptors.len(),
                })?;
        if neutral_descriptor.requires_capability_ready {
            return Err(ConfigError::NeutralRequiresCapability(neutral));
        }
        if neutral_descriptor.max_target_distance.is_some() {
            return Err(ConfigError::NeutralRequiresTarget(neutral));
        }
        Ok(Self {
            descriptors,
            neutral,
        })
    }

    /// Builds a table from configuration specs, assigning ids in list order.
    pub fn from_specs(specs: &[ActionSpec], neutral: ActionId) -> Result<Self, ConfigError> {
        let descriptors = specs
            .iter()
            .enumerate()
            .map(|(id, spec)| ActionDescriptor {
                id,
                target_state: spec.target_state.clone(),
                lock_duration: secs(spec.lock_secs),
                requires_capability_ready: spec.requires_capability_ready,
                max_target_distance: spec.max_target_distance,
            })
            .collect();
        Self::new(descriptors, neutral)
    }

    /// Builds the table described by a controller configuration.
    pub fn from_config(config: &ControllerConfig) -> Result<Self, ConfigError> {
        Self::from_specs(&config.actions, config.neutral_action)
    }

    /// The default melee table: `Detecting`, `Moving`, `Attacking`.
    pub fn melee() -> Self {
        Self {
            descriptors: vec![
                ActionDescriptor::new(0, "Detecting", secs(0.0), false),
                ActionDescriptor::new(1, "Moving", secs(0.0), false),
                ActionDescriptor::new(2, "Attacking", secs(0.5), true)
                    .with_max_target_distance(2.0),
            ],
            neutral: 0,
        }
    }

    pub fn get(&self, id: ActionId) -> Option<&ActionDescriptor> {
        self.descriptors.get(id)
    }

    /// The action that stays legal while another is locked.
    pub fn neutral(&self) -> ActionId {
        self.neutral
    }

    pub fn neutral_descriptor(&self) -> &ActionDescriptor {
        &self.descriptors[self.neutral]
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn contains(&self, id: ActionId) -> bool {
        id < self.descriptors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.descriptors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn melee_table_shape() {
        let table = ActionTable::melee();
        assert_eq!(table.len(), 3);
        assert_eq!(table.neutral(), 0);
        let attack = table.get(2).unwrap();
        assert_eq!(attack.target_state(), "Attacking");
        assert!(attack.is_locking());
        assert!(attack.requires_capability_ready());
        assert_eq!(attack.max_target_distance(), Some(2.0));
        assert!(!table.get(1).unwrap().is_locking());
    }

    #[test]
    fn melee_matches_default_config() {
        let from_config = ActionTable::from_config(&ControllerConfig::default()).unwrap();
        assert_eq!(from_config, ActionTable::melee());
    }

    #[test]
    fn empty_table_rejected() {
        assert_eq!(
            ActionTable::new(vec![], 0),
            Err(ConfigError::EmptyActionTable)
        );
    }

    #[test]
    fn negative_lock_rejected() {
        let result = ActionTable::new(
            vec![
                ActionDescriptor::new(0, "Idle", secs(0.0), false),
                ActionDescriptor::new(1, "Slash", secs(-0.1), false),
            ],
            0,
        );
        assert_eq!(
            result,
            Err(ConfigError::InvalidLockDuration { id: 1, secs: -0.1 })
        );
    }

    #[test]
    fn infinite_lock_rejected() {
        let result = ActionTable::new(
            vec![ActionDescriptor::new(0, "Idle", secs(f64::INFINITY), false)],
            0,
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidLockDuration { id: 0, .. })
        ));
    }

    #[test]
    fn non_dense_ids_rejected() {
        let result = ActionTable::new(
            vec![
                ActionDescriptor::new(0, "Idle", secs(0.0), false),
                ActionDescriptor::new(5, "Slash", secs(0.0), false),
            ],
            0,
        );
        assert_eq!(
            result,
            Err(ConfigError::NonDenseId { position: 1, id: 5 })
        );
    }

    #[test]
    fn negative_range_rejected() {
        let result = ActionTable::new(
            vec![
                ActionDescriptor::new(0, "Idle", secs(0.0), false),
                ActionDescriptor::new(1, "Slash", secs(0.0), false).with_max_target_distance(-1.0),
            ],
            0,
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidTargetDistance { id: 1, .. })
        ));
    }

    #[test]
    fn neutral_must_exist() {
        let specs = vec![ActionSpec::instant("Idle")];
        assert_eq!(
            ActionTable::from_specs(&specs, 3),
            Err(ConfigError::NeutralOutOfRange { neutral: 3, len: 1 })
        );
    }

    #[test]
    fn neutral_must_not_need_capability() {
        let specs = vec![ActionSpec::instant("Idle").requiring_capability()];
        assert_eq!(
            ActionTable::from_specs(&specs, 0),
            Err(ConfigError::NeutralRequiresCapability(0))
        );
    }

    #[test]
    fn neutral_must_not_need_target() {
        let specs = vec![ActionSpec::instant("Idle").within_range(1.0)];
        assert_eq!(
            ActionTable::from_specs(&specs, 0),
            Err(ConfigError::NeutralRequiresTarget(0))
        );
    }

    #[test]
    fn zero_lock_is_instantaneous() {
        let d = ActionDescriptor::new(0, "Idle", secs(0.0), false);
        assert!(!d.is_locking());
    }

    #[test]
    fn range_precondition() {
        let d = ActionDescriptor::new(0, "Hit", secs(0.0), false).with_max_target_distance(2.0);
        assert!(d.range_satisfied(Some(1.5)));
        assert!(d.range_satisfied(Some(2.0)));
        assert!(!d.range_satisfied(Some(2.5)));
        assert!(!d.range_satisfied(None));

        let unranged = ActionDescriptor::new(1, "Move", secs(0.0), false);
        assert!(unranged.range_satisfied(None));
    }

    #[test]
    fn display_includes_lock() {
        let table = ActionTable::melee();
        assert_eq!(table.get(2).unwrap().to_string(), "#2 Attacking (lock 0.500s)");
        assert_eq!(table.get(0).unwrap().to_string(), "#0 Detecting");
    }
}
