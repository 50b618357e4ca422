//! In-memory duel host for demos, evaluation and tests.
//!
//! A [`DuelArena`] holds one agent and one scripted opponent on a straight
//! line. It hands out the four collaborator handles the controller needs;
//! all of them view the same shared state. The opponent strikes on a fixed
//! period whenever the agent is within its reach. There is no physics: the
//! agent walks toward the opponent at constant speed while in the move state
//! and lands a hit the moment the attack state is entered with a ready weapon.

use std::cell::RefCell;
use std::rc::Rc;

use super::traits::{
    CapabilityProvider, PerceptionSource, Readiness, StateTransitionExecutor, VitalityProvider,
};
use crate::types::Vec3;

/// Tunables for the sandbox duel.
#[derive(Debug, Clone, PartialEq)]
pub struct DuelSettings {
    pub agent_start: Vec3,
    pub opponent_start: Vec3,
    pub agent_max_health: f64,
    pub opponent_max_health: f64,
    /// Distance at which the opponent becomes visible.
    pub detect_radius: f64,
    /// Agent walking speed (units per second).
    pub move_speed: f64,
    pub attack_damage: f64,
    pub attack_range: f64,
    /// Weapon cooldown after each hit, in seconds.
    pub weapon_cooldown: f64,
    pub opponent_damage: f64,
    pub opponent_reach: f64,
    /// Seconds between opponent strikes.
    pub opponent_period: f64,
    pub move_state: String,
    pub attack_state: String,
}

impl Default for DuelSettings {
    fn default() -> Self {
        Self {
            agent_start: Vec3::new(0.0, 0.0, 0.0),
            opponent_start: Vec3::new(6.0, 0.0, 0.0),
            agent_max_health: 100.0,
            opponent_max_health: 100.0,
            detect_radius: 10.0,
            move_speed: 4.0,
            attack_damage: 25.0,
            attack_range: 2.0,
            weapon_cooldown: 0.8,
            opponent_damage: 10.0,
            opponent_reach: 2.0,
            opponent_period: 1.0,
            move_state: "Moving".to_string(),
            attack_state: "Attacking".to_string(),
        }
    }
}

#[derive(Debug)]
struct DuelState {
    settings: DuelSettings,
    agent_pos: Vec3,
    agent_health: f64,
    opponent_pos: Vec3,
    opponent_health: f64,
    weapon_cooldown_left: f64,
    opponent_timer: f64,
    state: String,
    transitions: Vec<String>,
    revivals: u32,
}

impl DuelState {
    fn new(settings: DuelSettings) -> Self {
        Self {
            agent_pos: settings.agent_start,
            agent_health: settings.agent_max_health,
            opponent_pos: settings.opponent_start,
            opponent_health: settings.opponent_max_health,
            weapon_cooldown_left: 0.0,
            opponent_timer: 0.0,
            state: String::new(),
            transitions: Vec::new(),
            revivals: 0,
            settings,
        }
    }

    fn distance(&self) -> f64 {
        self.agent_pos.distance_to(&self.opponent_pos)
    }

    fn opponent_alive(&self) -> bool {
        self.opponent_health > 0.0
    }

    fn restart(&mut self) {
        self.agent_pos = self.settings.agent_start;
        self.agent_health = self.settings.agent_max_health;
        self.opponent_pos = self.settings.opponent_start;
        self.opponent_health = self.settings.opponent_max_health;
        self.weapon_cooldown_left = 0.0;
        self.opponent_timer = 0.0;
        self.revivals += 1;
    }
}

/// Shared duel world; cheap to clone (all clones see the same state).
#[derive(Debug, Clone)]
pub struct DuelArena {
    state: Rc<RefCell<DuelState>>,
}

/// Opaque opponent handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpponentHandle;

/// Perception view of a [`DuelArena`].
#[derive(Debug, Clone)]
pub struct ArenaPerception(DuelArena);

/// Vitality view of a [`DuelArena`]. Reviving restarts the whole duel,
/// opponent included.
#[derive(Debug, Clone)]
pub struct ArenaVitals(DuelArena);

/// Weapon view of a [`DuelArena`].
#[derive(Debug, Clone)]
pub struct ArenaWeapon(DuelArena);

/// Executor view of a [`DuelArena`].
#[derive(Debug, Clone)]
pub struct ArenaExecutor(DuelArena);

impl DuelArena {
    pub fn new(settings: DuelSettings) -> Self {
        Self {
            state: Rc::new(RefCell::new(DuelState::new(settings))),
        }
    }

    /// Collaborator handles for one controller.
    pub fn bindings(&self) -> (ArenaPerception, ArenaVitals, ArenaWeapon, ArenaExecutor) {
        (
            ArenaPerception(self.clone()),
            ArenaVitals(self.clone()),
            ArenaWeapon(self.clone()),
            ArenaExecutor(self.clone()),
        )
    }

    /// Advances the world by `dt` seconds: agent movement, weapon cooldown,
    /// and the opponent's strike timer.
    pub fn advance(&self, dt: f64) {
        let mut s = self.state.borrow_mut();
        if s.state == s.settings.move_state && s.opponent_alive() {
            let stop_at = s.settings.attack_range * 0.5;
            let gap = s.distance() - stop_at;
            if gap > 0.0 {
                let dir = s.agent_pos.direction_to(&s.opponent_pos);
                let step = gap.min(s.settings.move_speed * dt);
                s.agent_pos = s.agent_pos + Vec3::new(dir.x * step, dir.y * step, dir.z * step);
            }
        }

        s.weapon_cooldown_left = (s.weapon_cooldown_left - dt).max(0.0);

        if s.opponent_alive() && s.agent_health > 0.0 && s.distance() <= s.settings.opponent_reach
        {
            s.opponent_timer += dt;
            if s.opponent_timer >= s.settings.opponent_period {
                s.opponent_timer = 0.0;
                s.agent_health = (s.agent_health - s.settings.opponent_damage).max(0.0);
            }
        } else {
            s.opponent_timer = 0.0;
        }
    }

    pub fn agent_health(&self) -> f64 {
        self.state.borrow().agent_health
    }

    pub fn set_agent_health(&self, health: f64) {
        self.state.borrow_mut().agent_health = health;
    }

    pub fn opponent_health(&self) -> f64 {
        self.state.borrow().opponent_health
    }

    pub fn set_opponent_health(&self, health: f64) {
        self.state.borrow_mut().opponent_health = health;
    }

    pub fn distance(&self) -> f64 {
        self.state.borrow().distance()
    }

    /// The most recent executor state.
    pub fn current_state(&self) -> String {
        self.state.borrow().state.clone()
    }

    /// Every state the executor was asked to enter, in order.
    pub fn transitions(&self) -> Vec<String> {
        self.state.borrow().transitions.clone()
    }

    /// Number of times the duel was restarted through [`ArenaVitals::revive`].
    pub fn revivals(&self) -> u32 {
        self.state.borrow().revivals
    }
}

impl PerceptionSource for ArenaPerception {
    type Target = OpponentHandle;

    fn try_detect_target(&mut self) -> Option<OpponentHandle> {
        let s = self.0.state.borrow();
        (s.opponent_alive() && s.distance() <= s.settings.detect_radius).then_some(OpponentHandle)
    }

    fn target_position(&self, _target: OpponentHandle) -> Vec3 {
        self.0.state.borrow().opponent_pos
    }

    fn target_health_fraction(&self, _target: OpponentHandle) -> Option<f64> {
        let s = self.0.state.borrow();
        if s.settings.opponent_max_health > 0.0 {
            Some(s.opponent_health / s.settings.opponent_max_health)
        } else {
            None
        }
    }

    fn self_position(&self) -> Vec3 {
        self.0.state.borrow().agent_pos
    }
}

impl VitalityProvider for ArenaVitals {
    fn self_health(&self) -> f64 {
        self.0.state.borrow().agent_health
    }

    fn self_max_health(&self) -> f64 {
        self.0.state.borrow().settings.agent_max_health
    }

    fn revive(&mut self) {
        self.0.state.borrow_mut().restart();
    }
}

impl CapabilityProvider for ArenaWeapon {
    fn current(&self) -> Option<Readiness> {
        let s = self.0.state.borrow();
        let total = s.settings.weapon_cooldown;
        if s.weapon_cooldown_left <= 0.0 {
            Some(Readiness::ready())
        } else {
            let fraction = if total > 0.0 {
                s.weapon_cooldown_left / total
            } else {
                0.0
            };
            Some(Readiness::cooling(fraction))
        }
    }
}

impl StateTransitionExecutor for ArenaExecutor {
    fn transition_to(&mut self, state: &str) {
        let mut s = self.0.state.borrow_mut();
        s.state = state.to_string();
        s.transitions.push(state.to_string());

        let can_hit = state == s.settings.attack_state
            && s.weapon_cooldown_left <= 0.0
            && s.opponent_alive()
            && s.distance() <= s.settings.attack_range;
        if can_hit {
            s.opponent_health = (s.opponent_health - s.settings.attack_damage).max(0.0);
            s.weapon_cooldown_left = s.settings.weapon_cooldown;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_quarters() -> DuelSettings {
        DuelSettings {
            opponent_start: Vec3::new(1.5, 0.0, 0.0),
            ..DuelSettings::default()
        }
    }

    #[test]
    fn detects_opponent_within_radius() {
        let arena = DuelArena::new(DuelSettings::default());
        let (mut perception, ..) = arena.bindings();
        assert_eq!(perception.try_detect_target(), Some(OpponentHandle));
    }

    #[test]
    fn does_not_detect_far_opponent() {
        let arena = DuelArena::new(DuelSettings {
            opponent_start: Vec3::new(50.0, 0.0, 0.0),
            ..DuelSettings::default()
        });
        let (mut perception, ..) = arena.bindings();
        assert_eq!(perception.try_detect_target(), None);
    }

    #[test]
    fn moving_closes_distance() {
        let arena = DuelArena::new(DuelSettings::default());
        let (_, _, _, mut exec) = arena.bindings();
        exec.transition_to("Moving");
        let before = arena.distance();
        arena.advance(0.5);
        assert!((before - arena.distance() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn attack_in_range_hits_and_starts_cooldown() {
        let arena = DuelArena::new(close_quarters());
        let (_, _, weapon, mut exec) = arena.bindings();
        exec.transition_to("Attacking");
        assert_eq!(arena.opponent_health(), 75.0);
        assert!(!weapon.is_ready());
        arena.advance(0.8);
        assert!(weapon.is_ready());
    }

    #[test]
    fn attack_on_cooldown_does_nothing() {
        let arena = DuelArena::new(close_quarters());
        let (_, _, _, mut exec) = arena.bindings();
        exec.transition_to("Attacking");
        exec.transition_to("Attacking");
        assert_eq!(arena.opponent_health(), 75.0);
    }

    #[test]
    fn opponent_strikes_on_period() {
        let arena = DuelArena::new(close_quarters());
        for _ in 0..4 {
            arena.advance(0.25);
        }
        assert!((arena.agent_health() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn revive_restarts_duel() {
        let arena = DuelArena::new(close_quarters());
        let (_, mut vitals, ..) = arena.bindings();
        arena.set_agent_health(10.0);
        arena.set_opponent_health(0.0);
        vitals.revive();
        assert_eq!(arena.agent_health(), 100.0);
        assert_eq!(arena.opponent_health(), 100.0);
        assert_eq!(arena.revivals(), 1);
    }
}
