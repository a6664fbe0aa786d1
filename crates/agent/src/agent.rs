use crate::config::{AgentConfig, DEFAULT_EPISODE_LENGTH};
use crate::error::AgentError;
use crate::features::{FeatureVector, BAND_COUNT};
use crate::reward::RewardModel;
use crate::state::EnvironmentState;
use crate::trainer::{EpisodeReport, Trainer};
use crate::trajectory::Trajectory;
use ml::{CategoricalPolicy, StochasticPolicy};

/// What one valid packet produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepRecord {
    pub step: usize,
    pub state: FeatureVector,
    pub action: usize,
    pub log_prob: f32,
    pub reward: f32,
}

/// The learning session: environment view, reward shaping, policy,
/// trajectory buffer and trainer, owned together.
pub struct Agent<P = CategoricalPolicy> {
    config: AgentConfig,
    state: EnvironmentState,
    reward_model: RewardModel,
    policy: P,
    trajectory: Trajectory,
    trainer: Trainer,
}

impl Agent<CategoricalPolicy> {
    /// Builds an agent with a freshly initialised categorical policy.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: AgentConfig) -> Result<Self, AgentError> {
        config.validate()?;
        let policy = CategoricalPolicy::new(
            BAND_COUNT,
            config.hidden_width,
            config.action_count,
            config.activation.into(),
            config.seed,
        );
        Self::assemble(config, policy)
    }
}

impl<P: StochasticPolicy> Agent<P> {
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] if `config` does not validate or
    /// the policy's action count disagrees with it.
    pub fn with_policy(config: AgentConfig, policy: P) -> Result<Self, AgentError> {
        config.validate()?;
        Self::assemble(config, policy)
    }

    // `config` has already been validated
    fn assemble(config: AgentConfig, policy: P) -> Result<Self, AgentError> {
        if policy.action_count() != config.action_count {
            return Err(AgentError::InvalidConfig(format!(
                "policy has {} actions, config expects {}",
                policy.action_count(),
                config.action_count
            )));
        }
        let trainer = Trainer::new(config.discount_factor, config.optimizer.build(config.learning_rate));
        Ok(Self {
            state: EnvironmentState::new(config.episode_length),
            reward_model: RewardModel::new(config.target_ratios),
            trajectory: Trajectory::with_capacity(config.episode_length.min(DEFAULT_EPISODE_LENGTH)),
            policy,
            trainer,
            config,
        })
    }

    /// Consumes one valid packet: update state, act, score, record.
    pub fn step(&mut self, features: FeatureVector) -> StepRecord {
        self.state.update(features);
        let state = self.state.current();
        let outcome = self.policy.sample(state.as_slice());
        let reward = self.state.reward(&self.reward_model);
        self.trajectory.push(state, outcome, reward);
        StepRecord {
            step: self.state.steps(),
            state,
            action: outcome.action,
            log_prob: outcome.log_prob,
            reward,
        }
    }

    #[must_use]
    pub fn is_episode_complete(&self) -> bool {
        self.state.is_episode_complete()
    }

    /// Ends the episode, training on the trajectory unless it is partial and
    /// partial training is disabled. The trajectory is empty afterwards.
    pub fn finish_episode(&mut self, completed: bool) -> Option<EpisodeReport> {
        if !completed && !self.config.train_on_partial_episode {
            tracing::info!(
                steps = self.trajectory.len(),
                "episode ended early, discarding partial trajectory"
            );
            self.trajectory.clear();
            return None;
        }
        let report = self.trainer.update(&mut self.policy, &mut self.trajectory)?;
        tracing::info!(
            steps = report.steps,
            loss = report.loss,
            total_reward = report.total_reward,
            mean_return = report.mean_return,
            partial = !completed,
            "policy updated"
        );
        Some(report)
    }

    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }

    #[must_use]
    pub fn reward_model(&self) -> &RewardModel {
        &self.reward_model
    }

    #[must_use]
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    #[must_use]
    pub fn trainer(&self) -> &Trainer {
        &self.trainer
    }
}
