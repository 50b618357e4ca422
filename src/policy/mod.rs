//! Policy trait and implementations.

pub mod heuristic;
pub mod random;
pub mod scripted;
pub mod trait_;

pub use heuristic::HeuristicPolicy;
pub use random::RandomPolicy;
pub use scripted::ScriptedPolicy;
pub use trait_::Policy;
