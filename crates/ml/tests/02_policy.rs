mod common;

use common::close_tol;
use ml::{Activation, CategoricalPolicy, Dense, Sequential, Sgd, StochasticPolicy};

fn policy(seed: u64) -> CategoricalPolicy {
    CategoricalPolicy::new(5, 32, 2, Activation::Relu, Some(seed))
}

const OBS: [f32; 5] = [0.4, 0.2, 0.1, 0.2, 0.1];

#[test]
fn probabilities_form_a_distribution() {
    for activation in [Activation::Relu, Activation::Tanh] {
        let p = CategoricalPolicy::new(5, 8, 4, activation, Some(11));
        let probs = p.probs(&OBS);
        assert_eq!(probs.len(), 4);
        assert!(probs.iter().all(|&x| x >= 0.0));
        assert!(close_tol(probs.iter().sum::<f32>(), 1.0, 1e-5));
    }
}

#[test]
fn sampled_log_prob_matches_evaluation() {
    let mut p = policy(1);
    for _ in 0..20 {
        let outcome = p.sample(&OBS);
        assert!(outcome.action < 2);
        assert!(close_tol(outcome.log_prob, p.log_prob(&OBS, outcome.action), 1e-6));
    }
}

#[test]
fn out_of_range_action_has_zero_probability() {
    let p = policy(1);
    assert_eq!(p.log_prob(&OBS, 2), f32::NEG_INFINITY);
    assert_eq!(p.log_prob(&OBS, usize::MAX), f32::NEG_INFINITY);
    assert!(p.log_prob(&OBS, 1).is_finite());
}

#[test]
fn sampling_is_stochastic() {
    // zero weights give a uniform distribution over both actions
    let mut net = Sequential::new();
    net.push(Dense::new(vec![0.0; 5], vec![0.0], 5, 1));
    net.push(Dense::new(vec![0.0; 2], vec![0.0; 2], 1, 2));
    let mut p = CategoricalPolicy::from_network(net, 5, 2, fastrand::Rng::with_seed(7));
    let mut counts = [0usize; 2];
    for _ in 0..1000 {
        counts[p.sample(&OBS).action] += 1;
    }
    assert!(counts[0] > 350 && counts[1] > 350, "counts {counts:?}");
}

#[test]
fn seeded_policies_are_reproducible() {
    let mut a = policy(42);
    let mut b = policy(42);
    let xs: Vec<_> = (0..50).map(|_| a.sample(&OBS).action).collect();
    let ys: Vec<_> = (0..50).map(|_| b.sample(&OBS).action).collect();
    assert_eq!(xs, ys);
}

#[test]
fn log_prob_gradient_matches_finite_difference() {
    let mut p = CategoricalPolicy::new(5, 6, 3, Activation::Tanh, Some(5));
    p.zero_grad();
    p.accumulate_log_prob_grad(&OBS, 2, 1.0);
    let analytic: Vec<Vec<f32>> = p.gradients().iter().map(|g| g.data.clone()).collect();

    let h = 1e-2f32;
    for (param_idx, grads) in analytic.iter().enumerate() {
        for i in [0, grads.len() / 2, grads.len() - 1] {
            p.network_mut().params_mut()[param_idx].data[i] += h;
            let up = p.log_prob(&OBS, 2);
            p.network_mut().params_mut()[param_idx].data[i] -= 2.0 * h;
            let down = p.log_prob(&OBS, 2);
            p.network_mut().params_mut()[param_idx].data[i] += h;
            let numeric = (up - down) / (2.0 * h);
            assert!(
                close_tol(numeric, grads[i], 1e-2),
                "param {param_idx}[{i}] numeric {numeric} analytic {}",
                grads[i]
            );
        }
    }
}

#[test]
fn zero_grad_clears_accumulators() {
    let mut p = policy(3);
    p.accumulate_log_prob_grad(&OBS, 0, 1.0);
    assert!(p.gradients().iter().any(|g| g.data.iter().any(|&v| v != 0.0)));
    p.zero_grad();
    assert!(p.gradients().iter().all(|g| g.data.iter().all(|&v| v == 0.0)));
}

#[test]
fn descending_negative_log_prob_raises_action_probability() {
    let mut p = policy(9);
    let before = p.probs(&OBS)[1];
    let mut opt = Sgd::new(0.1);
    for _ in 0..10 {
        p.zero_grad();
        // loss = -log p(1), so d loss = -d log p(1)
        p.accumulate_log_prob_grad(&OBS, 1, -1.0);
        p.apply_gradients(&mut opt);
    }
    assert!(p.probs(&OBS)[1] > before);
}
