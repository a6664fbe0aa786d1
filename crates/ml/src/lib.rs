//! # ml
//!
//! Small CPU-only building blocks for policy-gradient learning: a flat
//! [`Tensor`] container, differentiable layers with hand-written backward
//! passes, first-order optimizers and a categorical policy network.
//!
//! Everything here is deliberately tiny. Networks are a handful of dense
//! layers evaluated one observation at a time, so gradients are computed by
//! replaying each layer's `backward` against the activations captured during
//! the forward pass rather than through a general autodiff tape.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]

pub mod nn;
pub mod optim;
pub mod policy;

pub use nn::{Activation, Dense, Layer, Relu, Sequential, Softmax, TanhAct};
pub use optim::{Adam, Optimizer, Sgd};
pub use policy::{ActionOutcome, CategoricalPolicy, StochasticPolicy};

#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl Tensor {
    /// Wraps `data` with the given shape.
    ///
    /// # Panics
    ///
    /// Panics if the shape does not describe exactly `data.len()` elements.
    #[must_use]
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Self {
        assert_eq!(shape.iter().product::<usize>(), data.len());
        Self { data, shape }
    }

    #[must_use]
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self { data: vec![0.0; len], shape }
    }

    #[must_use]
    pub fn zeros_like(other: &Tensor) -> Self {
        Self::zeros(other.shape.clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Adds `scale * other` element-wise into `self`.
    pub fn add_scaled(&mut self, other: &Tensor, scale: f32) {
        debug_assert_eq!(self.len(), other.len());
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += scale * b;
        }
    }

    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|v| *v = value);
    }
}
