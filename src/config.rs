//! Configuration for the decision controller.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::actions::ConfigError;
use crate::types::ActionId;

/// Plain description of one discrete action, as written in configuration.
///
/// Turned into an immutable [`ActionDescriptor`](crate::actions::ActionDescriptor)
/// by [`ActionTable::from_specs`](crate::actions::ActionTable::from_specs),
/// which assigns ids in list order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionSpec {
    /// Label handed to the state-transition executor.
    pub target_state: String,
    /// Minimum hold in seconds; 0 means instantaneous.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lock_secs: f64,
    /// Whether the action needs the capability (weapon) to be ready.
    #[cfg_attr(feature = "serde", serde(default))]
    pub requires_capability_ready: bool,
    /// Target must be detected and at most this far away.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_target_distance: Option<f64>,
}

impl ActionSpec {
    /// An instantaneous, ungated action.
    pub fn instant(target_state: impl Into<String>) -> Self {
        Self {
            target_state: target_state.into(),
            lock_secs: 0.0,
            requires_capability_ready: false,
            max_target_distance: None,
        }
    }

    /// An action held for `lock_secs` once started.
    pub fn locked(target_state: impl Into<String>, lock_secs: f64) -> Self {
        Self {
            lock_secs,
            ..Self::instant(target_state)
        }
    }

    pub fn requiring_capability(mut self) -> Self {
        self.requires_capability_ready = true;
        self
    }

    pub fn within_range(mut self, max_distance: f64) -> Self {
        self.max_target_distance = Some(max_distance);
        self
    }
}

/// Reward shaping weights.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RewardConfig {
    /// Added when the target's health drops.
    pub deal_damage_reward: f64,
    /// Added when the agent's own health drops.
    pub take_damage_penalty: f64,
    /// Added when the target is defeated.
    pub kill_target_reward: f64,
    /// Added when the agent is defeated.
    pub agent_died_penalty: f64,
    /// Added on every non-terminal tick.
    pub time_penalty: f64,
}

impl RewardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("deal_damage_reward", self.deal_damage_reward),
            ("take_damage_penalty", self.take_damage_penalty),
            ("kill_target_reward", self.kill_target_reward),
            ("agent_died_penalty", self.agent_died_penalty),
            ("time_penalty", self.time_penalty),
        ];
        for (name, value) in weights {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteRewardWeight(name));
            }
        }
        Ok(())
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            deal_damage_reward: 0.5,
            take_damage_penalty: -0.5,
            kill_target_reward: 1.0,
            agent_died_penalty: -1.0,
            time_penalty: -0.001,
        }
    }
}

/// Configuration for an [`AgentController`](crate::controller::AgentController).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Discrete actions; position in the list is the action id.
    pub actions: Vec<ActionSpec>,
    /// Action that stays legal while another action is locked.
    pub neutral_action: ActionId,
    /// Reward shaping weights.
    pub rewards: RewardConfig,
    /// Default tick duration in seconds for [`step`](crate::controller::AgentController::step).
    pub tick_secs: f64,
    /// Ticks after which an ongoing episode is truncated and reset.
    pub max_ticks: Option<u32>,
}

impl ControllerConfig {
    /// Checks the whole configuration before any episode starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_secs.is_finite() && self.tick_secs > 0.0) {
            return Err(ConfigError::InvalidTickDuration(self.tick_secs));
        }
        if self.max_ticks == Some(0) {
            return Err(ConfigError::ZeroHorizon);
        }
        self.rewards.validate()?;
        crate::actions::ActionTable::from_specs(&self.actions, self.neutral_action).map(|_| ())
    }

    /// Number of discrete actions.
    pub fn action_dim(&self) -> usize {
        self.actions.len()
    }

    /// Parses and validates a JSON configuration.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ControllerConfig {
    /// The melee agent: detect, move, and a half-second attack that needs a
    /// ready weapon and a target within 2 units.
    fn default() -> Self {
        Self {
            actions: vec![
                ActionSpec::instant("Detecting"),
                ActionSpec::instant("Moving"),
                ActionSpec::locked("Attacking", 0.5)
                    .requiring_capability()
                    .within_range(2.0),
            ],
            neutral_action: 0,
            rewards: RewardConfig::default(),
            tick_secs: 0.02,
            max_ticks: None,
        }
    }
}
