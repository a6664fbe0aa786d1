use crate::Tensor;

/// First-order optimizer applying one update to `(param, grad)` pairs.
///
/// Implementations may keep per-parameter state, so the pairs must be passed
/// in the same order on every call.
pub trait Optimizer: Send {
    fn step(&mut self, params: &mut [(&mut Tensor, &Tensor)]);
}

pub struct Sgd {
    pub lr: f32,
}

impl Sgd {
    #[must_use]
    pub fn new(lr: f32) -> Self {
        Self { lr }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [(&mut Tensor, &Tensor)]) {
        for (p, g) in params {
            for (pv, gv) in p.data.iter_mut().zip(&g.data) {
                *pv -= self.lr * gv;
            }
        }
    }
}

pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    t: i32,
    m: Vec<Vec<f32>>,
    v: Vec<Vec<f32>>,
}

impl Adam {
    #[must_use]
    pub fn new(lr: f32) -> Self {
        Self { lr, beta1: 0.9, beta2: 0.999, eps: 1e-8, t: 0, m: Vec::new(), v: Vec::new() }
    }

    /// Number of updates applied so far.
    #[must_use]
    pub fn steps(&self) -> i32 {
        self.t
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [(&mut Tensor, &Tensor)]) {
        if self.m.is_empty() {
            self.m = params.iter().map(|(p, _)| vec![0.0; p.len()]).collect();
            self.v = params.iter().map(|(p, _)| vec![0.0; p.len()]).collect();
        }
        self.t += 1;
        let bias1 = 1.0 - self.beta1.powi(self.t);
        let bias2 = 1.0 - self.beta2.powi(self.t);
        for ((p, g), (m_vec, v_vec)) in params.iter_mut().zip(self.m.iter_mut().zip(self.v.iter_mut())) {
            for i in 0..p.len() {
                m_vec[i] = self.beta1 * m_vec[i] + (1.0 - self.beta1) * g.data[i];
                v_vec[i] = self.beta2 * v_vec[i] + (1.0 - self.beta2) * g.data[i] * g.data[i];
                let m_hat = m_vec[i] / bias1;
                let v_hat = v_vec[i] / bias2;
                p.data[i] -= self.lr * m_hat / (v_hat.sqrt() + self.eps);
            }
        }
    }
}
