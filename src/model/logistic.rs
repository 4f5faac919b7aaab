//! Logistic head trained as one ensemble member
//!
//! Architecture: Input(12) → Linear(1) → sigmoid

use burn::module::Module;
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::features::FeatureVector;
use crate::{InjuryError, Result};

/// Single linear layer producing an injury logit
#[derive(Module, Debug)]
pub struct LogisticHead<B: Backend> {
    linear: Linear<B>,
}

impl<B: Backend> LogisticHead<B> {
    pub fn new(device: &B::Device) -> Self {
        LogisticHead {
            // Zero init keeps training reproducible; the loss is convex
            linear: LinearConfig::new(FeatureVector::DIM, 1)
                .with_initializer(Initializer::Zeros)
                .init(device),
        }
    }

    /// Injury logit [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        self.linear.forward(features)
    }

    /// Injury probability [batch, 1]
    pub fn forward_probability(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        sigmoid(self.forward(features))
    }

    /// Pull the learned weights and bias out of the tensors
    pub fn parameters(&self) -> Result<(Vec<f64>, f64)> {
        let weights: Vec<f32> = self
            .linear
            .weight
            .val()
            .into_data()
            .to_vec()
            .map_err(|e| InjuryError::Training(format!("Failed to read weights: {:?}", e)))?;

        let bias = match &self.linear.bias {
            Some(bias) => {
                let values: Vec<f32> = bias
                    .val()
                    .into_data()
                    .to_vec()
                    .map_err(|e| InjuryError::Training(format!("Failed to read bias: {:?}", e)))?;
                values.first().copied().unwrap_or(0.0)
            }
            None => 0.0,
        };

        Ok((
            weights.into_iter().map(|w| w as f64).collect(),
            bias as f64,
        ))
    }
}
