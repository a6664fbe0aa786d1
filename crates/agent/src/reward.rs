//! Potential-based shaping reward over band-power ratios.
//!
//! The potential of a state is its ratio vector's Euclidean distance to the
//! target. Each step is rewarded with the decrease in that distance since the
//! previous step, so an episode's rewards sum to the initial distance minus
//! the final one.

use crate::error::AgentError;
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};

/// Keeps the ratio denominator non-zero when every band reads zero.
pub const RATIO_EPSILON: f32 = 1e-6;

const TARGET_SUM_TOLERANCE: f32 = 1e-3;

/// Each band divided by the total power (plus [`RATIO_EPSILON`]).
#[must_use]
pub fn normalized_ratios(state: &FeatureVector) -> FeatureVector {
    let denom = state.sum() + RATIO_EPSILON;
    state.map(|v| v / denom)
}

/// Desired steady-state share of each band.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f32; 5]", into = "[f32; 5]")]
pub struct TargetRatios(FeatureVector);

impl TargetRatios {
    /// # Errors
    ///
    /// Rejects non-finite or negative fractions and an all-zero target.
    pub fn new(ratios: [f32; 5]) -> Result<Self, AgentError> {
        if ratios.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(AgentError::InvalidConfig(format!(
                "target_ratios must be finite and non-negative, got {ratios:?}"
            )));
        }
        let sum: f32 = ratios.iter().sum();
        if sum <= 0.0 {
            return Err(AgentError::InvalidConfig("target_ratios must not all be zero".into()));
        }
        if (sum - 1.0).abs() > TARGET_SUM_TOLERANCE {
            tracing::warn!(sum, "target_ratios do not sum to 1; shaping reward may never reach zero");
        }
        Ok(Self(FeatureVector(ratios)))
    }

    #[must_use]
    pub fn as_vector(&self) -> &FeatureVector {
        &self.0
    }
}

impl TryFrom<[f32; 5]> for TargetRatios {
    type Error = AgentError;

    fn try_from(ratios: [f32; 5]) -> Result<Self, Self::Error> {
        Self::new(ratios)
    }
}

impl From<TargetRatios> for [f32; 5] {
    fn from(target: TargetRatios) -> Self {
        target.0 .0
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RewardModel {
    target: TargetRatios,
}

impl RewardModel {
    #[must_use]
    pub fn new(target: TargetRatios) -> Self {
        Self { target }
    }

    #[must_use]
    pub fn target(&self) -> &TargetRatios {
        &self.target
    }

    /// Distance from the ratios of `ratios` to the target.
    #[must_use]
    pub fn potential(&self, ratios: &FeatureVector) -> f32 {
        ratios.distance(self.target.as_vector())
    }

    /// Returns `(prev_dist - curr_dist, curr_ratios)`.
    ///
    /// `curr_ratios` is the reference the caller must pass as `prev_ratios`
    /// on the next step.
    #[must_use]
    pub fn reward(&self, state: &FeatureVector, prev_ratios: &FeatureVector) -> (f32, FeatureVector) {
        let curr_ratios = normalized_ratios(state);
        let curr_dist = self.potential(&curr_ratios);
        let prev_dist = self.potential(prev_ratios);
        (prev_dist - curr_dist, curr_ratios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn ratios_of_positive_vector_sum_to_one() {
        for v in [[1.0, 2.0, 3.0, 4.0, 5.0], [0.001, 0.0, 0.0, 0.0, 0.0], [120.0, 3.5, 80.0, 0.25, 9.0]] {
            let r = normalized_ratios(&FeatureVector(v));
            assert!(close(r.sum(), 1.0), "{r}");
        }
    }

    #[test]
    fn ratios_of_zero_vector_are_zero() {
        let r = normalized_ratios(&FeatureVector::ZERO);
        assert_eq!(r, FeatureVector::ZERO);
    }

    #[test]
    fn reward_is_distance_decrease() {
        let model = RewardModel::new(TargetRatios::new([0.2; 5]).unwrap());
        let prev = FeatureVector([1.0, 0.0, 0.0, 0.0, 0.0]);
        let state = FeatureVector([1.0, 1.0, 1.0, 1.0, 1.0]);
        let (reward, ratios) = model.reward(&state, &prev);
        let prev_dist = prev.distance(&FeatureVector([0.2; 5]));
        assert!(close(reward, prev_dist - model.potential(&ratios)));
        assert!(reward > 0.0);
    }

    #[test]
    fn target_validation() {
        assert!(TargetRatios::new([0.0; 5]).is_err());
        assert!(TargetRatios::new([f32::NAN, 0.0, 0.0, 0.0, 1.0]).is_err());
        assert!(TargetRatios::new([-0.1, 0.3, 0.3, 0.3, 0.2]).is_err());
        assert!(TargetRatios::new([0.5, 0.5, 0.5, 0.0, 0.0]).is_ok());
    }
}
