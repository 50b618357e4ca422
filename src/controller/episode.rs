//! The per-agent decision controller and its episode lifecycle.
//!
//! One tick is split in two so that an external policy (a trainer process,
//! a human at the keyboard) can sit between the halves:
//!
//! 1. [`AgentController::observe`] advances the lock timer, runs detection,
//!    builds the observation and the legal action set.
//! 2. [`AgentController::apply`] consumes that [`TickContext`] together with
//!    the chosen action, runs the lock scheduler, scores the tick and resets
//!    the episode on a terminal outcome.
//!
//! [`AgentController::step`] runs both halves with an in-process [`Policy`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::gate::{ActionGate, LegalActions};
use super::lock::{Decision, LockScheduler, LockState};
use super::observation::{Observation, ObservationBuilder, ObservationInput, TargetReading};
use super::reward::{RewardShaper, VitalitySnapshot};
use crate::actions::{ActionTable, ConfigError};
use crate::config::ControllerConfig;
use crate::host::{CapabilityProvider, PerceptionSource, StateTransitionExecutor, VitalityProvider};
use crate::metrics::EpisodeListener;
use crate::policy::Policy;
use crate::types::{ActionId, EpisodeOutcome};
use crate::units::{sanitize_dt, secs, Seconds};
use crate::{generate_id, Id};

/// First half of a tick: what the policy gets to see.
///
/// Consumed by [`AgentController::apply`]; a context is valid only for the
/// tick it was created on.
#[derive(Debug)]
pub struct TickContext {
    tick: u64,
    dt: Seconds,
    observation: Observation,
    legal: LegalActions,
    capability_ready: bool,
    released: Option<ActionId>,
}

impl TickContext {
    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    pub fn legal(&self) -> &LegalActions {
        &self.legal
    }

    pub fn capability_ready(&self) -> bool {
        self.capability_ready
    }

    /// Action whose lock was released at the start of this tick.
    pub fn released(&self) -> Option<ActionId> {
        self.released
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn dt(&self) -> Seconds {
        self.dt
    }
}

/// Result of one full tick.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Observation the action was chosen from.
    pub observation: Observation,
    /// Legal set the action was chosen from.
    pub legal: LegalActions,
    /// What the scheduler did with the chosen action.
    pub decision: Decision,
    /// Incremental reward for this tick.
    pub reward: f64,
    pub outcome: EpisodeOutcome,
    /// Ongoing episode cut off by the tick horizon.
    pub truncated: bool,
    /// Lock released at the start of this tick.
    pub released: Option<ActionId>,
    /// Controller-lifetime tick counter.
    pub tick: u64,
    /// Ticks into the episode, this one included.
    pub episode_tick: u32,
    /// Episode number this tick belonged to.
    pub episode: u32,
}

impl StepResult {
    /// True if the episode ended on this tick (and the controller has reset).
    pub fn done(&self) -> bool {
        self.outcome.is_terminal() || self.truncated
    }
}

/// Decision/lock/reward loop for one agent.
///
/// Owns its collaborators, its [`LockState`] and its [`VitalitySnapshot`];
/// agents never share mutable state, so one controller per agent is all
/// the synchronization a multi-agent host needs.
///
/// # Lifecycle
///
/// 1. Build with [`AgentController::new`].
/// 2. Optionally [`assign_target`](AgentController::assign_target) and
///    [`add_listener`](AgentController::add_listener).
/// 3. Call [`on_episode_begin`](AgentController::on_episode_begin).
/// 4. Tick with [`step`](AgentController::step) or
///    [`observe`](AgentController::observe) + [`apply`](AgentController::apply).
///    Terminal outcomes restart the episode automatically.
pub struct AgentController<P, V, C, X>
where
    P: PerceptionSource,
    V: VitalityProvider,
    C: CapabilityProvider,
    X: StateTransitionExecutor,
{
    id: Id,
    config: ControllerConfig,
    scheduler: LockScheduler,
    shaper: RewardShaper,
    lock: LockState,
    vitality: VitalitySnapshot,
    assigned_target: Option<P::Target>,
    tracked_target: Option<P::Target>,
    perception: P,
    vitals: V,
    capability: C,
    executor: X,
    tick: u64,
    pending: Option<u64>,
    episode: u32,
    episode_ticks: u32,
    listeners: Vec<Box<dyn EpisodeListener>>,
}

impl<P, V, C, X> AgentController<P, V, C, X>
where
    P: PerceptionSource,
    V: VitalityProvider,
    C: CapabilityProvider,
    X: StateTransitionExecutor,
{
    /// Validates `config` and wires the collaborators.
    ///
    /// Nothing is called on the collaborators except reading max health;
    /// call [`on_episode_begin`](Self::on_episode_begin) to start.
    pub fn new(
        config: ControllerConfig,
        perception: P,
        vitals: V,
        capability: C,
        executor: X,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = Arc::new(ActionTable::from_config(&config)?);
        let vitality = VitalitySnapshot::at_episode_start(vitals.self_max_health(), false);
        Ok(Self {
            id: generate_id(),
            scheduler: LockScheduler::new(table),
            shaper: RewardShaper::new(config.rewards.clone()),
            config,
            lock: LockState::default(),
            vitality,
            assigned_target: None,
            tracked_target: None,
            perception,
            vitals,
            capability,
            executor,
            tick: 0,
            pending: None,
            episode: 0,
            episode_ticks: 0,
            listeners: Vec::new(),
        })
    }

    /// Registers a host-side consumer of episode boundaries and tick results.
    pub fn add_listener(&mut self, listener: Box<dyn EpisodeListener>) {
        self.listeners.push(listener);
    }

    /// Sets the target the orchestrator wants this agent to fight.
    ///
    /// The assignment survives resets; targets found by detection replace
    /// it only until the next reset.
    pub fn assign_target(&mut self, target: Option<P::Target>) {
        self.assigned_target = target;
        self.tracked_target = None;
        if let Some(target) = target {
            self.track(target);
        }
    }

    /// Restores every piece of episode state to its start value and asks
    /// the vitality provider to revive the agent. Idempotent.
    pub fn reset(&mut self) {
        self.vitals.revive();
        self.lock.reset();
        self.tracked_target = self.assigned_target;
        self.vitality = VitalitySnapshot::at_episode_start(
            self.vitals.self_max_health(),
            self.assigned_target.is_some(),
        );
        self.pending = None;
        self.episode_ticks = 0;
    }

    /// Starts a new episode: resets and returns the executor to the neutral
    /// action's state. Used for natural termination and forced restarts alike.
    pub fn on_episode_begin(&mut self) {
        self.reset();
        let neutral = self.scheduler.table().neutral_descriptor();
        self.executor.transition_to(neutral.target_state());
        self.episode += 1;
        info!(agent = %self.id, episode = self.episode, "episode started");
        for listener in &mut self.listeners {
            listener.on_episode_begin();
        }
    }

    /// First half of a tick. See the module docs.
    ///
    /// A negative or non-finite `dt` is treated as zero elapsed time.
    pub fn observe(&mut self, dt: Seconds) -> TickContext {
        self.tick = self.tick.wrapping_add(1);
        let dt = if sanitize_dt(dt).value() == dt.value() {
            dt
        } else {
            warn!(agent = %self.id, dt = dt.value(), "invalid tick duration treated as zero");
            secs(0.0)
        };

        let readiness = self.capability.current();
        let capability_ready = readiness.is_some_and(|r| r.is_ready);

        let released = self.scheduler.advance(&mut self.lock, dt, capability_ready);
        if let Some(action) = released {
            debug!(agent = %self.id, action, "lock released");
        }

        let detected = self.perception.try_detect_target();
        if let Some(target) = detected {
            self.track(target);
        }
        let target = detected.map(|t| TargetReading {
            position: self.perception.target_position(t),
            health_fraction: self.perception.target_health_fraction(t),
        });

        let observation = ObservationBuilder::build(&ObservationInput {
            target,
            self_position: self.perception.self_position(),
            self_health_fraction: self.vitals.self_health_fraction(),
            capability: readiness,
        });
        let legal = ActionGate::legal_actions(self.scheduler.table(), &self.lock, capability_ready);

        self.pending = Some(self.tick);
        TickContext {
            tick: self.tick,
            dt,
            observation,
            legal,
            capability_ready,
            released,
        }
    }

    /// Second half of a tick. See the module docs.
    ///
    /// A context superseded by a later [`observe`](Self::observe) is
    /// rejected as [`Decision::Stale`] with zero reward and no state change.
    pub fn apply(&mut self, ctx: TickContext, action: ActionId) -> StepResult {
        if self.pending != Some(ctx.tick) {
            warn!(agent = %self.id, action, tick = ctx.tick, "stale tick context ignored");
            return StepResult {
                observation: ctx.observation,
                legal: ctx.legal,
                decision: Decision::Stale { action },
                reward: 0.0,
                outcome: EpisodeOutcome::Ongoing,
                truncated: false,
                released: ctx.released,
                tick: ctx.tick,
                episode_tick: self.episode_ticks,
                episode: self.episode,
            };
        }
        self.pending = None;

        let decision = self.scheduler.submit(
            &mut self.lock,
            action,
            &ctx.legal,
            ctx.observation.target_distance(),
            &mut self.executor,
        );
        self.log_decision(&decision);

        let self_health = self.vitals.self_health();
        let target_health = self
            .tracked_target
            .and_then(|t| self.perception.target_health_fraction(t));
        let signal = self
            .shaper
            .evaluate(&mut self.vitality, self_health, target_health);

        self.episode_ticks = self.episode_ticks.saturating_add(1);
        let truncated = !signal.outcome.is_terminal()
            && self
                .config
                .max_ticks
                .is_some_and(|max| self.episode_ticks >= max);

        let result = StepResult {
            observation: ctx.observation,
            legal: ctx.legal,
            decision,
            reward: signal.reward,
            outcome: signal.outcome,
            truncated,
            released: ctx.released,
            tick: ctx.tick,
            episode_tick: self.episode_ticks,
            episode: self.episode,
        };

        for listener in &mut self.listeners {
            listener.on_step_result(&result);
        }

        if result.done() {
            info!(
                agent = %self.id,
                episode = self.episode,
                ticks = self.episode_ticks,
                outcome = %signal.outcome,
                truncated,
                "episode ended"
            );
            self.on_episode_begin();
        }
        result
    }

    /// One full tick of `dt` with an in-process policy.
    pub fn step_for(&mut self, dt: Seconds, policy: &mut dyn Policy) -> StepResult {
        let ctx = self.observe(dt);
        let action = policy.select_action(ctx.observation(), ctx.legal());
        self.apply(ctx, action)
    }

    /// One full tick of the configured tick duration.
    pub fn step(&mut self, policy: &mut dyn Policy) -> StepResult {
        self.step_for(secs(self.config.tick_secs), policy)
    }

    fn track(&mut self, target: P::Target) {
        if self.tracked_target == Some(target) {
            return;
        }
        self.tracked_target = Some(target);
        if let Some(health) = self.perception.target_health_fraction(target) {
            self.vitality.rebase_target(health);
        }
        debug!(agent = %self.id, ?target, "target acquired");
    }

    fn log_decision(&self, decision: &Decision) {
        match *decision {
            Decision::Locked { action, duration } => {
                debug!(agent = %self.id, action, lock_secs = duration.value(), "action locked")
            }
            Decision::Instant { action } => debug!(agent = %self.id, action, "action started"),
            Decision::Discarded {
                requested,
                locked_by,
            } => debug!(agent = %self.id, requested, locked_by, "choice discarded while locked"),
            Decision::OutOfRange { action } => {
                debug!(agent = %self.id, action, "no target in range")
            }
            Decision::Illegal { action } => {
                warn!(agent = %self.id, action, "illegal action chosen")
            }
            Decision::InvalidAction { action } => warn!(
                agent = %self.id,
                action,
                actions = self.scheduler.table().len(),
                "action id out of range"
            ),
            Decision::Stale { action } => warn!(agent = %self.id, action, "stale decision"),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn action_table(&self) -> &ActionTable {
        self.scheduler.table()
    }

    pub fn lock_state(&self) -> &LockState {
        &self.lock
    }

    pub fn vitality(&self) -> &VitalitySnapshot {
        &self.vitality
    }

    /// Target used for reward shaping, if any.
    pub fn tracked_target(&self) -> Option<P::Target> {
        self.tracked_target
    }

    /// Episodes started so far.
    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn episode_ticks(&self) -> u32 {
        self.episode_ticks
    }

    pub fn perception(&self) -> &P {
        &self.perception
    }

    pub fn perception_mut(&mut self) -> &mut P {
        &mut self.perception
    }

    pub fn vitals(&self) -> &V {
        &self.vitals
    }

    pub fn vitals_mut(&mut self) -> &mut V {
        &mut self.vitals
    }

    pub fn capability(&self) -> &C {
        &self.capability
    }

    pub fn capability_mut(&mut self) -> &mut C {
        &mut self.capability
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut X {
        &mut self.executor
    }
}
