//! skirmish - per-tick decision control for autonomous combat agents
//!
//! Each simulation tick the controller observes the agent's surroundings,
//! restricts the discrete actions the policy may choose from, enforces
//! minimum-duration action locks, and turns health deltas into a scalar
//! reward for a hosting training loop.
//!
//! The engine side (perception, health, weapon readiness, animation state
//! machine) is reached only through the traits in [`host`].

pub mod actions;
pub mod config;
pub mod controller;
pub mod host;
pub mod metrics;
pub mod policy;
pub mod types;
pub mod units;

pub use actions::{ActionDescriptor, ActionTable, ConfigError};
pub use config::{ActionSpec, ControllerConfig, RewardConfig};
pub use controller::{
    ActionGate, AgentController, Decision, LegalActions, LockScheduler, LockState, Observation,
    ObservationBuilder, RewardShaper, StepResult, TickContext, VitalitySnapshot,
};
pub use metrics::{EpisodeListener, EpisodeStats, EvaluationMetrics};
pub use policy::{HeuristicPolicy, Policy, RandomPolicy, ScriptedPolicy};
pub use types::{ActionId, EpisodeOutcome, Vec3};
pub use units::{convert, to_seconds, SameDim};

/// Identifier type used for controller instances in log fields.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
