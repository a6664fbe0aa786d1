mod common;

use common::close;
use ml::{Adam, Dense, Layer, Optimizer, Relu, Sequential, Sgd, Softmax, TanhAct, Tensor};

#[test]
fn dense_forward() {
    let dense = Dense::new(vec![1.0, 2.0, -3.0, 0.5], vec![0.1, -0.2], 2, 2);
    let x = Tensor::from_vec(vec![2], vec![0.5, -1.0]);
    let y = dense.forward(&x);
    assert!(close(&y.data, &[0.1 + 0.5 - 2.0, -0.2 - 1.5 - 0.5]));
}

#[test]
fn dense_backward_gradients() {
    let w = vec![1.0, 2.0,
                 -3.0, 0.5];
    let b = vec![0.1, -0.2];
    let x = Tensor::from_vec(vec![2], vec![0.5, -1.0]);
    let dense = Dense::new(w, b, 2, 2);
    let grad_out = Tensor::from_vec(vec![2], vec![1.0, -2.0]);
    let (dx, dw, db) = dense.backward(&x, &grad_out);
    let expected_dx = vec![1.0*1.0 + -3.0*(-2.0), 2.0*1.0 + 0.5*(-2.0)];
    let expected_dw = vec![0.5*1.0, -1.0*1.0,
                           0.5*(-2.0), -1.0*(-2.0)];
    assert!(close(&dx.data, &expected_dx));
    assert!(close(&dw.data, &expected_dw));
    assert!(close(&db.data, &grad_out.data));
}

#[test]
fn xavier_respects_glorot_limit() {
    let mut rng = fastrand::Rng::with_seed(3);
    let dense = Dense::xavier(5, 32, &mut rng);
    let limit = (6.0f32 / 37.0).sqrt();
    assert_eq!(dense.w.shape, vec![32, 5]);
    assert!(dense.w.data.iter().all(|w| w.abs() <= limit));
    assert!(dense.b.data.iter().all(|&b| b == 0.0));
}

#[test]
fn relu_forward_backward() {
    let x = Tensor::from_vec(vec![3], vec![-1.0, 0.0, 2.0]);
    let relu = Relu;
    let y = relu.forward(&x);
    assert_eq!(y.data, vec![0.0, 0.0, 2.0]);
    let grad_out = Tensor::from_vec(vec![3], vec![0.1, 0.2, 0.3]);
    let (dx, _) = relu.backward(&x, &grad_out);
    assert_eq!(dx.data, vec![0.0, 0.0, 0.3]);
}

#[test]
fn tanh_forward_backward() {
    let x = Tensor::from_vec(vec![2], vec![0.0, 1.0]);
    let t = TanhAct;
    let y = t.forward(&x);
    let expected = vec![0.0f32.tanh(), 1.0f32.tanh()];
    assert!(close(&y.data, &expected));
    let grad_out = Tensor::from_vec(vec![2], vec![0.2, -0.1]);
    let (dx, _) = t.backward(&x, &grad_out);
    let exp_dx = vec![0.2 * (1.0 - expected[0].powi(2)), -0.1 * (1.0 - expected[1].powi(2))];
    assert!(close(&dx.data, &exp_dx));
}

#[test]
fn softmax_forward_backward() {
    let x = Tensor::from_vec(vec![3], vec![1.0, 2.0, 3.0]);
    let sm = Softmax;
    let y = sm.forward(&x);
    let exp_vals: Vec<f32> = vec![1.0f32.exp(), 2.0f32.exp(), 3.0f32.exp()];
    let sum: f32 = exp_vals.iter().sum();
    let expected: Vec<f32> = exp_vals.iter().map(|e| e / sum).collect();
    assert!(close(&y.data, &expected));
    let grad_out = Tensor::from_vec(vec![3], vec![0.1, -0.1, 0.0]);
    let (dx, _) = sm.backward(&x, &grad_out);
    let mut exp_dx = vec![0.0f32; 3];
    for i in 0..3 {
        for j in 0..3 {
            let delta = if i == j { 1.0 } else { 0.0 };
            exp_dx[j] += grad_out.data[i] * expected[i] * (delta - expected[j]);
        }
    }
    assert!(close(&dx.data, &exp_dx));
}

#[test]
fn softmax_is_stable_for_large_logits() {
    let x = Tensor::from_vec(vec![2], vec![1000.0, 1000.0]);
    let y = Softmax.forward(&x);
    assert!(close(&y.data, &[0.5, 0.5]));
}

#[test]
fn sequential_forward_backward() {
    let mut seq = Sequential::new();
    seq.push(Dense::new(vec![1.0], vec![0.0], 1, 1));
    seq.push(Relu);
    seq.push(Dense::new(vec![0.5], vec![0.0], 1, 1));
    let x = Tensor::from_vec(vec![1], vec![2.0]);
    let (out, activations) = seq.forward(&x);
    let h1: f32 = 1.0 * 2.0 + 0.0;
    let h1a = h1.max(0.0);
    let y = 0.5 * h1a + 0.0;
    assert!((out.data[0] - y).abs() < 1e-6);
    assert_eq!(activations.len(), 4);

    let grad_out = Tensor::from_vec(vec![1], vec![1.0]);
    let (dx, grads) = seq.backward(&activations, &grad_out);
    // same order as params_mut: dw1, db1, dw2, db2
    assert_eq!(grads.len(), 4);
    let relu_grad = if h1 > 0.0 { 1.0 } else { 0.0 };
    assert!(close(&grads[0].data, &[2.0 * 0.5 * relu_grad]));
    assert!(close(&grads[1].data, &[0.5 * relu_grad]));
    assert!(close(&grads[2].data, &[h1a]));
    assert!(close(&grads[3].data, &[1.0]));
    assert!(close(&dx.data, &[0.5 * relu_grad]));

    let shapes: Vec<_> = seq.params_mut().iter().map(|p| p.shape.clone()).collect();
    let grad_shapes: Vec<_> = grads.iter().map(|g| g.shape.clone()).collect();
    assert_eq!(shapes, grad_shapes);
}

#[test]
fn sgd_update() {
    let mut param = Tensor::from_vec(vec![2], vec![1.0, -1.0]);
    let grad = Tensor::from_vec(vec![2], vec![0.5, -0.5]);
    let mut opt = Sgd::new(0.1);
    opt.step(&mut [(&mut param, &grad)]);
    assert!(close(&param.data, &[0.95, -0.95]));
}

#[test]
fn adam_update() {
    let mut param = Tensor::from_vec(vec![1], vec![1.0]);
    let grad = Tensor::from_vec(vec![1], vec![0.1]);
    let mut opt = Adam::new(0.1);
    opt.step(&mut [(&mut param, &grad)]);
    // after first step of Adam with zero init moments
    let m_hat: f32 = 0.1;
    let v_hat: f32 = 0.01;
    let expected = 1.0 - 0.1 * m_hat / (v_hat.sqrt() + 1e-8f32);
    assert!((param.data[0] - expected).abs() < 1e-6);
    assert_eq!(opt.steps(), 1);
}

#[test]
fn adam_zero_gradient_leaves_params() {
    let mut param = Tensor::from_vec(vec![3], vec![0.3, -0.2, 1.0]);
    let grad = Tensor::zeros(vec![3]);
    let mut opt = Adam::new(1e-3);
    for _ in 0..5 {
        opt.step(&mut [(&mut param, &grad)]);
    }
    assert!(close(&param.data, &[0.3, -0.2, 1.0]));
}
