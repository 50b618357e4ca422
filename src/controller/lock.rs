//! Minimum-duration action locks.
//!
//! The scheduler is a two-state machine, `Unlocked` and `Locked(a)`. A lock
//! is entered when a legal action with a positive lock duration is started,
//! and released at the start of a later tick once its timer has run out and,
//! for capability-gated actions, the capability is ready again. Both release
//! conditions are required together.

use std::fmt;
use std::sync::Arc;

use super::gate::LegalActions;
use crate::actions::ActionTable;
use crate::host::StateTransitionExecutor;
use crate::types::ActionId;
use crate::units::{saturating_decrement, secs, Seconds};

/// Per-episode lock runtime state.
///
/// Kept apart from the immutable [`ActionTable`]; only [`LockScheduler`]
/// mutates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockState {
    locked_action: Option<ActionId>,
    remaining: Seconds,
}

impl LockState {
    /// A lock on `action` with `remaining` time left.
    pub fn locked(action: ActionId, remaining: Seconds) -> Self {
        Self {
            locked_action: Some(action),
            remaining,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked_action.is_some()
    }

    pub fn locked_action(&self) -> Option<ActionId> {
        self.locked_action
    }

    /// Time left on the current lock; zero when unlocked.
    pub fn remaining(&self) -> Seconds {
        self.remaining
    }

    /// Back to `Unlocked` with a zero timer.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Default for LockState {
    fn default() -> Self {
        Self {
            locked_action: None,
            remaining: secs(0.0),
        }
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.locked_action {
            Some(action) => write!(f, "locked({}, {:.3}s)", action, self.remaining.value()),
            None => write!(f, "unlocked"),
        }
    }
}

/// What the scheduler did with the action chosen this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Started and locked for `duration`.
    Locked { action: ActionId, duration: Seconds },
    /// Started with no lock.
    Instant { action: ActionId },
    /// Dropped because `locked_by` is still executing.
    Discarded {
        requested: ActionId,
        locked_by: ActionId,
    },
    /// Rejected by the action gate this tick.
    Illegal { action: ActionId },
    /// Needs a target within range and none was.
    OutOfRange { action: ActionId },
    /// Id outside the action table.
    InvalidAction { action: ActionId },
    /// The tick context was superseded by a newer one.
    Stale { action: ActionId },
}

impl Decision {
    /// The action handed to the executor, if any.
    pub fn started_action(&self) -> Option<ActionId> {
        match self {
            Decision::Locked { action, .. } | Decision::Instant { action } => Some(*action),
            _ => None,
        }
    }

    /// True for choices that produced nothing and were not explained by an
    /// active lock.
    pub fn is_wasted(&self) -> bool {
        matches!(
            self,
            Decision::Illegal { .. }
                | Decision::OutOfRange { .. }
                | Decision::InvalidAction { .. }
                | Decision::Stale { .. }
        )
    }
}

/// Enforces lock durations over a shared [`ActionTable`].
#[derive(Debug, Clone)]
pub struct LockScheduler {
    table: Arc<ActionTable>,
}

impl LockScheduler {
    pub fn new(table: Arc<ActionTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ActionTable {
        &self.table
    }

    /// Start-of-tick update, run before any new action is considered.
    ///
    /// Decrements the lock timer by `dt` (clamped at zero) and releases the
    /// lock once the timer is exhausted and, when the locked action needs
    /// the capability, `capability_ready` holds. Returns the released action.
    pub fn advance(
        &self,
        state: &mut LockState,
        dt: Seconds,
        capability_ready: bool,
    ) -> Option<ActionId> {
        let action = state.locked_action?;
        state.remaining = saturating_decrement(state.remaining, dt);

        if state.remaining.value() > 0.0 {
            return None;
        }
        let needs_capability = self
            .table
            .get(action)
            .is_some_and(|d| d.requires_capability_ready());
        if needs_capability && !capability_ready {
            return None;
        }

        state.reset();
        Some(action)
    }

    /// Applies the externally chosen action.
    ///
    /// Never fails: invalid, illegal, out-of-range and locked-out choices
    /// are no-ops reported through the returned [`Decision`]. Started
    /// actions are handed to `executor` immediately.
    pub fn submit<X>(
        &self,
        state: &mut LockState,
        action: ActionId,
        legal: &LegalActions,
        target_distance: Option<f64>,
        executor: &mut X,
    ) -> Decision
    where
        X: StateTransitionExecutor + ?Sized,
    {
        let Some(descriptor) = self.table.get(action) else {
            return Decision::InvalidAction { action };
        };
        if let Some(locked_by) = state.locked_action {
            return Decision::Discarded {
                requested: action,
                locked_by,
            };
        }
        if !legal.contains(action) {
            return Decision::Illegal { action };
        }
        if !descriptor.range_satisfied(target_distance) {
            return Decision::OutOfRange { action };
        }

        executor.transition_to(descriptor.target_state());

        if descriptor.is_locking() {
            let duration = descriptor.lock_duration();
            *state = LockState::locked(action, duration);
            Decision::Locked { action, duration }
        } else {
            Decision::Instant { action }
        }
    }
}
