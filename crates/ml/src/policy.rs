//! Stochastic policies over a discrete action set.

use crate::nn::{Activation, Layer, Sequential, Softmax};
use crate::optim::Optimizer;
use crate::Tensor;

/// An action drawn from a policy together with its log-probability at the
/// time it was drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionOutcome {
    pub action: usize,
    pub log_prob: f32,
}

/// Capability contract between action selection and learning.
///
/// A trainer never needs the sampling call site: it re-evaluates
/// `log p(action | obs)` under the current parameters and accumulates its
/// gradient, then hands the accumulated gradients to an [`Optimizer`].
pub trait StochasticPolicy {
    fn action_count(&self) -> usize;

    /// Action probabilities for `obs`. Non-negative and summing to one.
    fn probs(&self, obs: &[f32]) -> Vec<f32>;

    /// Draws one action from `probs(obs)`.
    fn sample(&mut self, obs: &[f32]) -> ActionOutcome;

    /// Natural log of the probability of `action`; negative infinity for an
    /// action outside `0..action_count()`.
    fn log_prob(&self, obs: &[f32], action: usize) -> f32 {
        self.probs(obs).get(action).map_or(f32::NEG_INFINITY, |&p| ln_prob(p))
    }

    /// Resets every accumulated gradient to zero.
    fn zero_grad(&mut self);

    /// Adds `scale * d/dθ log p(action | obs)` to the accumulated gradients.
    fn accumulate_log_prob_grad(&mut self, obs: &[f32], action: usize, scale: f32);

    /// Applies the accumulated gradients through `optimizer` as a descent step.
    fn apply_gradients(&mut self, optimizer: &mut dyn Optimizer);
}

fn ln_prob(p: f32) -> f32 {
    p.max(f32::MIN_POSITIVE).ln()
}

/// Feed-forward network producing logits, normalised with a softmax into a
/// categorical distribution.
pub struct CategoricalPolicy {
    net: Sequential,
    grads: Vec<Tensor>,
    obs_dim: usize,
    action_count: usize,
    rng: fastrand::Rng,
}

impl CategoricalPolicy {
    /// Builds `obs_dim → hidden → activation → action_count`.
    ///
    /// With `seed` set, both weight initialisation and action sampling are
    /// reproducible.
    #[must_use]
    pub fn new(
        obs_dim: usize,
        hidden: usize,
        action_count: usize,
        activation: Activation,
        seed: Option<u64>,
    ) -> Self {
        let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        let net = Sequential::mlp(obs_dim, hidden, action_count, activation, &mut rng);
        Self::from_network(net, obs_dim, action_count, rng)
    }

    /// Wraps an existing network whose output width is `action_count`.
    #[must_use]
    pub fn from_network(net: Sequential, obs_dim: usize, action_count: usize, rng: fastrand::Rng) -> Self {
        let grads = net.params().into_iter().map(Tensor::zeros_like).collect();
        Self { net, grads, obs_dim, action_count, rng }
    }

    #[must_use]
    pub fn network(&self) -> &Sequential {
        &self.net
    }

    pub fn network_mut(&mut self) -> &mut Sequential {
        &mut self.net
    }

    /// Accumulated gradients, in parameter order.
    #[must_use]
    pub fn gradients(&self) -> &[Tensor] {
        &self.grads
    }

    fn obs_tensor(&self, obs: &[f32]) -> Tensor {
        debug_assert_eq!(obs.len(), self.obs_dim);
        Tensor::from_vec(vec![obs.len()], obs.to_vec())
    }
}

impl StochasticPolicy for CategoricalPolicy {
    fn action_count(&self) -> usize {
        self.action_count
    }

    fn probs(&self, obs: &[f32]) -> Vec<f32> {
        let (logits, _) = self.net.forward(&self.obs_tensor(obs));
        Softmax.forward(&logits).data
    }

    fn sample(&mut self, obs: &[f32]) -> ActionOutcome {
        let probs = self.probs(obs);
        let u = self.rng.f32();
        let mut cumulative = 0.0;
        let mut action = probs.len() - 1;
        for (i, &p) in probs.iter().enumerate() {
            cumulative += p;
            if u < cumulative {
                action = i;
                break;
            }
        }
        ActionOutcome { action, log_prob: ln_prob(probs[action]) }
    }

    fn zero_grad(&mut self) {
        for g in &mut self.grads {
            g.fill(0.0);
        }
    }

    fn accumulate_log_prob_grad(&mut self, obs: &[f32], action: usize, scale: f32) {
        let (logits, activations) = self.net.forward(&self.obs_tensor(obs));
        let probs = Softmax.forward(&logits);
        // d log softmax(z)[a] / dz = onehot(a) - p
        let grad_logits: Vec<f32> = probs
            .data
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let indicator = if i == action { 1.0 } else { 0.0 };
                scale * (indicator - p)
            })
            .collect();
        let grad_logits = Tensor::from_vec(logits.shape.clone(), grad_logits);
        let (_, param_grads) = self.net.backward(&activations, &grad_logits);
        for (acc, g) in self.grads.iter_mut().zip(&param_grads) {
            acc.add_scaled(g, 1.0);
        }
    }

    fn apply_gradients(&mut self, optimizer: &mut dyn Optimizer) {
        let mut pairs: Vec<(&mut Tensor, &Tensor)> =
            self.net.params_mut().into_iter().zip(self.grads.iter()).collect();
        optimizer.step(&mut pairs);
        tracing::trace!(tensors = pairs.len(), "applied policy gradients");
    }
}
