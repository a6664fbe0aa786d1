//! Episodic REINFORCE update.
//!
//! A finished [`Trajectory`] is reduced to one loss,
//! `-Σ_t log π(a_t | s_t) · Ĝ_t`, where `Ĝ_t` are the discounted returns
//! standardised over the whole episode, and the policy takes one optimizer
//! step on it. The whole episode has to be buffered first: normalisation
//! needs every return.

use crate::trajectory::Trajectory;
use ml::{Optimizer, StochasticPolicy};

/// Added to the standard deviation so constant returns normalise to zero.
pub const RETURN_EPSILON: f32 = 1e-6;

/// `R_t = r_t + γ R_{t+1}` with `R_T = 0`, computed back to front.
#[must_use]
pub fn discounted_returns(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let mut returns = vec![0.0; rewards.len()];
    let mut running = 0.0;
    for (ret, &r) in returns.iter_mut().zip(rewards).rev() {
        running = r + gamma * running;
        *ret = running;
    }
    returns
}

/// Standardises `returns` to zero mean and (roughly) unit variance.
///
/// Uses the sample standard deviation (`n - 1` denominator); with fewer than
/// two returns the deviation is taken as zero.
#[must_use]
pub fn normalize_returns(returns: &[f32]) -> Vec<f32> {
    let n = returns.len();
    if n == 0 {
        return Vec::new();
    }
    let mean = returns.iter().sum::<f32>() / n as f32;
    let std = if n > 1 {
        (returns.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / (n - 1) as f32).sqrt()
    } else {
        0.0
    };
    returns.iter().map(|r| (r - mean) / (std + RETURN_EPSILON)).collect()
}

/// `-Σ log_prob_t · advantage_t`.
#[must_use]
pub fn policy_gradient_loss(log_probs: &[f32], advantages: &[f32]) -> f32 {
    debug_assert_eq!(log_probs.len(), advantages.len());
    -log_probs
        .iter()
        .zip(advantages)
        .map(|(&l, &a)| l * a)
        .sum::<f32>()
}

/// Summary of one applied update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeReport {
    pub steps: usize,
    pub loss: f32,
    pub total_reward: f32,
    pub mean_return: f32,
}

pub struct Trainer {
    gamma: f32,
    optimizer: Box<dyn Optimizer>,
    updates: usize,
}

impl Trainer {
    #[must_use]
    pub fn new(gamma: f32, optimizer: Box<dyn Optimizer>) -> Self {
        Self { gamma, optimizer, updates: 0 }
    }

    #[must_use]
    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// Number of updates applied so far.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Applies one policy-gradient step for `trajectory`, then clears it.
    ///
    /// Returns `None` without touching the policy when the trajectory is
    /// empty.
    pub fn update<P>(&mut self, policy: &mut P, trajectory: &mut Trajectory) -> Option<EpisodeReport>
    where
        P: StochasticPolicy + ?Sized,
    {
        if trajectory.is_empty() {
            tracing::debug!("empty trajectory, skipping update");
            return None;
        }

        let returns = discounted_returns(trajectory.rewards(), self.gamma);
        let normalized = normalize_returns(&returns);
        let loss = policy_gradient_loss(trajectory.log_probs(), &normalized);

        policy.zero_grad();
        for ((state, &action), &advantage) in trajectory
            .states()
            .iter()
            .zip(trajectory.actions())
            .zip(&normalized)
        {
            // d loss = -advantage * d log π
            policy.accumulate_log_prob_grad(state.as_slice(), action, -advantage);
        }
        policy.apply_gradients(self.optimizer.as_mut());
        self.updates += 1;

        let report = EpisodeReport {
            steps: trajectory.len(),
            loss,
            total_reward: trajectory.total_reward(),
            mean_return: returns.iter().sum::<f32>() / returns.len() as f32,
        };
        trajectory.clear();
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f32], b: &[f32]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn returns_follow_recursion() {
        let gamma = 0.9;
        let (r0, r1, r2) = (1.0, -2.0, 0.5);
        let returns = discounted_returns(&[r0, r1, r2], gamma);
        assert!(close(&returns, &[r0 + gamma * (r1 + gamma * r2), r1 + gamma * r2, r2]));
    }

    #[test]
    fn zero_discount_returns_rewards() {
        assert!(close(&discounted_returns(&[3.0, 1.0, 2.0], 0.0), &[3.0, 1.0, 2.0]));
        assert!(discounted_returns(&[], 0.99).is_empty());
    }

    #[test]
    fn constant_returns_normalize_to_zero() {
        let n = normalize_returns(&[2.5; 100]);
        assert!(n.iter().all(|v| v.abs() < 1e-6));
        assert!(close(&normalize_returns(&[4.0]), &[0.0]));
    }

    #[test]
    fn normalized_returns_are_standardized() {
        let n = normalize_returns(&[1.0, 2.0, 3.0, 4.0]);
        let mean: f32 = n.iter().sum::<f32>() / 4.0;
        let var: f32 = n.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / 3.0;
        assert!(mean.abs() < 1e-6);
        assert!((var - 1.0).abs() < 1e-4);
    }

    #[test]
    fn loss_is_negated_weighted_sum() {
        let loss = policy_gradient_loss(&[-0.5, -1.0], &[1.0, -2.0]);
        assert!((loss - (-(-0.5 * 1.0 + -1.0 * -2.0))).abs() < 1e-6);
    }
}
