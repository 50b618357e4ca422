//! The decision/lock/reward loop.
//!
//! Leaves first: [`observation`] encodes features, [`gate`] restricts the
//! legal set, [`lock`] enforces minimum action durations, [`reward`] turns
//! health deltas into reward, and [`episode`] ties them into one controller
//! per agent.

pub mod episode;
pub mod gate;
pub mod lock;
pub mod observation;
pub mod reward;


pub use episode::{AgentController, StepResult, TickContext};
pub use gate::{ActionGate, LegalActions};
pub use lock::{Decision, LockScheduler, LockState};
pub use observation::{Observation, ObservationBuilder, ObservationInput, TargetReading};
pub use reward::{RewardShaper, RewardSignal, VitalitySnapshot};
