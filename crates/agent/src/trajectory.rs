use crate::features::FeatureVector;
use ml::ActionOutcome;

/// One episode's worth of steps, stored column-wise.
///
/// All columns always have the same length; index `t` in each refers to the
/// same step.
#[derive(Clone, Debug, Default)]
pub struct Trajectory {
    states: Vec<FeatureVector>,
    actions: Vec<usize>,
    log_probs: Vec<f32>,
    rewards: Vec<f32>,
}

impl Trajectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            states: Vec::with_capacity(capacity),
            actions: Vec::with_capacity(capacity),
            log_probs: Vec::with_capacity(capacity),
            rewards: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, state: FeatureVector, outcome: ActionOutcome, reward: f32) {
        self.states.push(state);
        self.actions.push(outcome.action);
        self.log_probs.push(outcome.log_prob);
        self.rewards.push(reward);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    #[must_use]
    pub fn states(&self) -> &[FeatureVector] {
        &self.states
    }

    #[must_use]
    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    #[must_use]
    pub fn log_probs(&self) -> &[f32] {
        &self.log_probs
    }

    #[must_use]
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    #[must_use]
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }

    pub fn clear(&mut self) {
        self.states.clear();
        self.actions.clear();
        self.log_probs.clear();
        self.rewards.clear();
    }
}
