//! Engine-side collaborator contracts and an in-memory duel host.

pub mod sandbox;
pub mod traits;

pub use sandbox::{DuelArena, DuelSettings};
pub use traits::{
    CapabilityProvider, NoCapability, PerceptionSource, Readiness, StateTransitionExecutor,
    VitalityProvider,
};
