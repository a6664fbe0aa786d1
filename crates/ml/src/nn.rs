use crate::Tensor;

/// A fully connected layer computing `y = W x + b`.
///
/// `w` is stored row-major with shape `[out_dim, in_dim]`.
#[derive(Clone, Debug)]
pub struct Dense {
    pub w: Tensor,
    pub b: Tensor,
    in_dim: usize,
    out_dim: usize,
}

impl Dense {
    /// # Panics
    ///
    /// Panics if `weights` or `bias` do not match the requested dimensions.
    #[must_use]
    pub fn new(weights: Vec<f32>, bias: Vec<f32>, in_dim: usize, out_dim: usize) -> Self {
        assert_eq!(weights.len(), in_dim * out_dim);
        assert_eq!(bias.len(), out_dim);
        Self {
            w: Tensor::from_vec(vec![out_dim, in_dim], weights),
            b: Tensor::from_vec(vec![out_dim], bias),
            in_dim,
            out_dim,
        }
    }

    /// Glorot-uniform weights, zero bias.
    #[must_use]
    pub fn xavier(in_dim: usize, out_dim: usize, rng: &mut fastrand::Rng) -> Self {
        let limit = (6.0f32 / (in_dim as f32 + out_dim as f32)).sqrt();
        let weights: Vec<f32> = (0..in_dim * out_dim)
            .map(|_| rng.f32() * 2.0 * limit - limit)
            .collect();
        let bias = vec![0.0; out_dim];
        Self::new(weights, bias, in_dim, out_dim)
    }

    #[must_use]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[must_use]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    #[must_use]
    pub fn forward(&self, x: &Tensor) -> Tensor {
        let mut y = vec![0f32; self.out_dim];
        for (o, out) in y.iter_mut().enumerate() {
            let row = &self.w.data[o * self.in_dim..(o + 1) * self.in_dim];
            *out = self.b.data[o] + row.iter().zip(&x.data).map(|(w, x)| w * x).sum::<f32>();
        }
        Tensor::from_vec(vec![self.out_dim], y)
    }

    /// Returns `(dx, dw, db)` for upstream gradient `grad` at input `x`.
    #[must_use]
    pub fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Tensor, Tensor) {
        let mut grad_input = vec![0.0; self.in_dim];
        let mut grad_w = vec![0.0; self.in_dim * self.out_dim];
        let mut grad_b = vec![0.0; self.out_dim];
        for o in 0..self.out_dim {
            let go = grad.data[o];
            for i in 0..self.in_dim {
                grad_w[o * self.in_dim + i] += go * x.data[i];
                grad_input[i] += self.w.data[o * self.in_dim + i] * go;
            }
            grad_b[o] += go;
        }
        (
            Tensor::from_vec(vec![self.in_dim], grad_input),
            Tensor::from_vec(vec![self.out_dim, self.in_dim], grad_w),
            Tensor::from_vec(vec![self.out_dim], grad_b),
        )
    }
}

// Trait representing a differentiable layer
pub trait Layer {
    fn forward(&self, x: &Tensor) -> Tensor;
    /// Returns the gradient with respect to the layer input followed by one
    /// gradient per entry of [`Layer::params`], in the same order.
    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>);
    fn params(&self) -> Vec<&Tensor> {
        Vec::new()
    }
    fn params_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }
}

impl Layer for Dense {
    fn forward(&self, x: &Tensor) -> Tensor {
        Dense::forward(self, x)
    }
    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let (dx, dw, db) = Dense::backward(self, x, grad);
        (dx, vec![dw, db])
    }
    fn params(&self) -> Vec<&Tensor> {
        vec![&self.w, &self.b]
    }
    fn params_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.w, &mut self.b]
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct Relu;

impl Layer for Relu {
    fn forward(&self, x: &Tensor) -> Tensor {
        let data: Vec<f32> = x.data.iter().map(|&v| v.max(0.0)).collect();
        Tensor::from_vec(x.shape.clone(), data)
    }

    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let data: Vec<f32> = x
            .data
            .iter()
            .zip(&grad.data)
            .map(|(&v, &g)| if v > 0.0 { g } else { 0.0 })
            .collect();
        (Tensor::from_vec(x.shape.clone(), data), Vec::new())
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct TanhAct;

impl Layer for TanhAct {
    fn forward(&self, x: &Tensor) -> Tensor {
        let data: Vec<f32> = x.data.iter().map(|&v| v.tanh()).collect();
        Tensor::from_vec(x.shape.clone(), data)
    }

    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let data: Vec<f32> = x
            .data
            .iter()
            .zip(&grad.data)
            .map(|(&v, &g)| {
                let t = v.tanh();
                g * (1.0 - t * t)
            })
            .collect();
        (Tensor::from_vec(x.shape.clone(), data), Vec::new())
    }
}

/// Max-shifted softmax over the whole tensor.
#[derive(Default, Clone, Copy, Debug)]
pub struct Softmax;

impl Layer for Softmax {
    fn forward(&self, x: &Tensor) -> Tensor {
        let m = x.data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exp: Vec<f32> = x.data.iter().map(|&v| (v - m).exp()).collect();
        let sum: f32 = exp.iter().sum();
        let data: Vec<f32> = exp.iter().map(|&e| e / sum).collect();
        Tensor::from_vec(x.shape.clone(), data)
    }

    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let sm = self.forward(x);
        let n = sm.data.len();
        let mut result = vec![0.0f32; n];
        for i in 0..n {
            for (j, r) in result.iter_mut().enumerate() {
                let delta = if i == j { 1.0 } else { 0.0 };
                *r += grad.data[i] * sm.data[i] * (delta - sm.data[j]);
            }
        }
        (Tensor::from_vec(x.shape.clone(), result), Vec::new())
    }
}

/// Hidden-layer non-linearity selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Activation {
    #[default]
    Relu,
    Tanh,
}

impl Activation {
    fn push_onto(self, seq: &mut Sequential) {
        match self {
            Activation::Relu => seq.push(Relu),
            Activation::Tanh => seq.push(TanhAct),
        }
    }
}

#[derive(Default)]
pub struct Sequential {
    layers: Vec<Box<dyn Layer + Send>>,
}

impl Sequential {
    #[must_use]
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// `in_dim → hidden → activation → out_dim`, Glorot-initialised.
    #[must_use]
    pub fn mlp(
        in_dim: usize,
        hidden: usize,
        out_dim: usize,
        activation: Activation,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let mut seq = Self::new();
        seq.push(Dense::xavier(in_dim, hidden, rng));
        activation.push_onto(&mut seq);
        seq.push(Dense::xavier(hidden, out_dim, rng));
        seq
    }

    pub fn push<L: Layer + Send + 'static>(&mut self, layer: L) {
        self.layers.push(Box::new(layer));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the output and every intermediate activation, input first.
    #[must_use]
    pub fn forward(&self, x: &Tensor) -> (Tensor, Vec<Tensor>) {
        let mut out = x.clone();
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(out.clone());
        for layer in &self.layers {
            out = layer.forward(&out);
            activations.push(out.clone());
        }
        (out, activations)
    }

    /// Back-propagates `grad` through the stack.
    ///
    /// Parameter gradients come back in the same order as [`Sequential::params_mut`].
    #[must_use]
    pub fn backward(&self, activations: &[Tensor], grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let mut grad_out = grad.clone();
        let mut per_layer = Vec::with_capacity(self.layers.len());
        for (layer, activation) in self
            .layers
            .iter()
            .rev()
            .zip(activations.iter().rev().skip(1))
        {
            let (g_in, p) = layer.backward(activation, &grad_out);
            grad_out = g_in;
            per_layer.push(p);
        }
        let param_grads = per_layer.into_iter().rev().flatten().collect();
        (grad_out, param_grads)
    }

    #[must_use]
    pub fn params(&self) -> Vec<&Tensor> {
        self.layers.iter().flat_map(|l| l.params()).collect()
    }

    pub fn params_mut(&mut self) -> Vec<&mut Tensor> {
        let mut out = Vec::new();
        for layer in &mut self.layers {
            out.extend(layer.params_mut());
        }
        out
    }
}
