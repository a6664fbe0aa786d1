use crate::error::AgentError;
use crate::reward::TargetRatios;
use ml::{Activation, Adam, Optimizer, Sgd};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_DISCOUNT_FACTOR: f32 = 0.99;
pub const DEFAULT_EPISODE_LENGTH: usize = 1000;
pub const DEFAULT_ACTION_COUNT: usize = 2;
pub const DEFAULT_LEARNING_RATE: f32 = 1e-3;
pub const DEFAULT_HIDDEN_WIDTH: usize = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationKind {
    #[default]
    Relu,
    Tanh,
}

impl From<ActivationKind> for Activation {
    fn from(kind: ActivationKind) -> Self {
        match kind {
            ActivationKind::Relu => Activation::Relu,
            ActivationKind::Tanh => Activation::Tanh,
        }
    }
}

impl FromStr for ActivationKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relu" => Ok(Self::Relu),
            "tanh" => Ok(Self::Tanh),
            other => Err(AgentError::InvalidConfig(format!("unknown activation '{other}'"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Adam,
    Sgd,
}

impl OptimizerKind {
    #[must_use]
    pub fn build(self, learning_rate: f32) -> Box<dyn Optimizer> {
        match self {
            OptimizerKind::Adam => Box::new(Adam::new(learning_rate)),
            OptimizerKind::Sgd => Box::new(Sgd::new(learning_rate)),
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "adam" => Ok(Self::Adam),
            "sgd" => Ok(Self::Sgd),
            other => Err(AgentError::InvalidConfig(format!("unknown optimizer '{other}'"))),
        }
    }
}

/// Everything needed to build an [`Agent`](crate::Agent).
///
/// Only `target_ratios` is required when loading from JSON:
///
/// ```json
/// { "target_ratios": [0.4, 0.2, 0.1, 0.2, 0.1], "discount_factor": 0.95 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub target_ratios: TargetRatios,
    #[serde(default = "default_discount_factor")]
    pub discount_factor: f32,
    #[serde(default = "default_episode_length")]
    pub episode_length: usize,
    #[serde(default = "default_action_count")]
    pub action_count: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    #[serde(default = "default_hidden_width")]
    pub hidden_width: usize,
    #[serde(default)]
    pub activation: ActivationKind,
    #[serde(default)]
    pub optimizer: OptimizerKind,
    /// Train on whatever was collected when the stream ends early.
    #[serde(default = "default_train_on_partial_episode")]
    pub train_on_partial_episode: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_discount_factor() -> f32 {
    DEFAULT_DISCOUNT_FACTOR
}

fn default_episode_length() -> usize {
    DEFAULT_EPISODE_LENGTH
}

fn default_action_count() -> usize {
    DEFAULT_ACTION_COUNT
}

fn default_learning_rate() -> f32 {
    DEFAULT_LEARNING_RATE
}

fn default_hidden_width() -> usize {
    DEFAULT_HIDDEN_WIDTH
}

fn default_train_on_partial_episode() -> bool {
    true
}

impl AgentConfig {
    /// Default configuration for the given target.
    #[must_use]
    pub fn new(target_ratios: TargetRatios) -> Self {
        Self {
            target_ratios,
            discount_factor: DEFAULT_DISCOUNT_FACTOR,
            episode_length: DEFAULT_EPISODE_LENGTH,
            action_count: DEFAULT_ACTION_COUNT,
            learning_rate: DEFAULT_LEARNING_RATE,
            hidden_width: DEFAULT_HIDDEN_WIDTH,
            activation: ActivationKind::default(),
            optimizer: OptimizerKind::default(),
            train_on_partial_episode: true,
            seed: None,
        }
    }

    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] for unparseable JSON or values
    /// rejected by [`AgentConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, AgentError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AgentError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// As [`AgentConfig::from_json_str`], plus [`AgentError::Io`] when the
    /// file cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), AgentError> {
        let invalid = |msg: String| Err(AgentError::InvalidConfig(msg));
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return invalid(format!("discount_factor must be in [0, 1], got {}", self.discount_factor));
        }
        if self.episode_length == 0 {
            return invalid("episode_length must be at least 1".into());
        }
        if self.action_count == 0 {
            return invalid("action_count must be at least 1".into());
        }
        if self.hidden_width == 0 {
            return invalid("hidden_width must be at least 1".into());
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return invalid(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if self.action_count == 1 {
            tracing::warn!("action_count is 1; the policy has nothing to learn");
        }
        Ok(())
    }
}
