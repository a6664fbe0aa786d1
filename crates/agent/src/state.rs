use crate::features::FeatureVector;
use crate::reward::RewardModel;

/// The agent's view of the environment: latest band powers, a step counter,
/// and the ratio vector the shaping reward was last measured from.
#[derive(Clone, Debug)]
pub struct EnvironmentState {
    current: FeatureVector,
    steps: usize,
    prev_ratios: FeatureVector,
    episode_length: usize,
}

impl EnvironmentState {
    #[must_use]
    pub fn new(episode_length: usize) -> Self {
        Self {
            current: FeatureVector::ZERO,
            steps: 0,
            prev_ratios: FeatureVector::ZERO,
            episode_length,
        }
    }

    /// Stores `packet` as the current state and advances the step counter.
    pub fn update(&mut self, packet: FeatureVector) {
        self.current = packet;
        self.steps += 1;
    }

    #[must_use]
    pub fn current(&self) -> FeatureVector {
        self.current
    }

    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[must_use]
    pub fn prev_ratios(&self) -> FeatureVector {
        self.prev_ratios
    }

    #[must_use]
    pub fn episode_length(&self) -> usize {
        self.episode_length
    }

    #[must_use]
    pub fn is_episode_complete(&self) -> bool {
        self.steps >= self.episode_length
    }

    /// Scores the current state and moves the shaping reference to it.
    pub fn reward(&mut self, model: &RewardModel) -> f32 {
        let (reward, ratios) = model.reward(&self.current, &self.prev_ratios);
        self.prev_ratios = ratios;
        reward
    }
}
