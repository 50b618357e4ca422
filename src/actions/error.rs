use thiserror::Error;

use crate::types::ActionId;

/// Construction-time configuration failures.
///
/// Everything that can be wrong with a configuration is rejected before the
/// first episode starts; the tick path itself never fails.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Action table must contain at least one action")]
    EmptyActionTable,

    #[error("Action at position {position} has id {id}; ids must be dense and in order")]
    NonDenseId { position: usize, id: ActionId },

    #[error("Action {id} has invalid lock duration {secs}s (must be finite and >= 0)")]
    InvalidLockDuration { id: ActionId, secs: f64 },

    #[error("Action {id} has invalid maximum target distance {distance} (must be finite and >= 0)")]
    InvalidTargetDistance { id: ActionId, distance: f64 },

    #[error("Neutral action {neutral} is outside the action table of size {len}")]
    NeutralOutOfRange { neutral: ActionId, len: usize },

    #[error("Neutral action {0} must not require capability readiness")]
    NeutralRequiresCapability(ActionId),

    #[error("Neutral action {0} must not require a target in range")]
    NeutralRequiresTarget(ActionId),

    #[error("Reward weight {0} must be finite")]
    NonFiniteRewardWeight(&'static str),

    #[error("Tick duration must be finite and > 0, got {0}")]
    InvalidTickDuration(f64),

    #[error("Episode horizon must be at least one tick")]
    ZeroHorizon,

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}
