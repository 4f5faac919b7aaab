//! Burn Dataset implementation for injury training data

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::{InjuryError, Result};

/// Z-score normalization parameters computed from training data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureNormalization {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl FeatureNormalization {
    /// Compute mean and std per feature across all samples
    pub fn from_samples(samples: &[InjurySample]) -> Self {
        let mut sum = vec![0.0f64; FeatureVector::DIM];
        let mut sum_sq = vec![0.0f64; FeatureVector::DIM];

        for sample in samples {
            for (j, v) in sample.features.to_array().iter().enumerate() {
                sum[j] += v;
                sum_sq[j] += v * v;
            }
        }

        let n = samples.len().max(1) as f64;
        let mean: Vec<f64> = sum.iter().map(|s| s / n).collect();
        let std: Vec<f64> = sum_sq
            .iter()
            .zip(mean.iter())
            .map(|(sq, m)| (sq / n - m * m).max(0.0).sqrt().max(1e-3))
            .collect();

        FeatureNormalization { mean, std }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// (x - mean) / std, or `None` when the dimensions disagree
    pub fn apply(&self, values: &[f64]) -> Option<Vec<f64>> {
        if values.len() != self.mean.len() || values.len() != self.std.len() {
            return None;
        }
        Some(
            values
                .iter()
                .zip(self.mean.iter().zip(self.std.iter()))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
        )
    }
}

/// One labelled training example
#[derive(Debug, Clone, PartialEq)]
pub struct InjurySample {
    pub features: FeatureVector,
    pub injured: bool,
}

/// In-memory labelled dataset
#[derive(Debug, Clone, Default)]
pub struct InjuryDataset {
    samples: Vec<InjurySample>,
}

impl InjuryDataset {
    pub fn new(samples: Vec<InjurySample>) -> Self {
        InjuryDataset { samples }
    }

    pub fn samples(&self) -> &[InjurySample] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn positive_count(&self) -> usize {
        self.samples.iter().filter(|s| s.injured).count()
    }

    /// Split into (train, test) keeping the class ratio in both halves
    pub fn stratified_split(&self, test_fraction: f64, seed: u64) -> Result<(Self, Self)> {
        if !(0.0..1.0).contains(&test_fraction) {
            return Err(InjuryError::Training(format!(
                "test fraction must be in [0, 1), got {}",
                test_fraction
            )));
        }

        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let mut train = Vec::with_capacity(self.samples.len());
        let mut test = Vec::new();

        for label in [false, true] {
            let mut class: Vec<InjurySample> = self
                .samples
                .iter()
                .filter(|s| s.injured == label)
                .cloned()
                .collect();
            class.shuffle(&mut rng);

            let n_test = (class.len() as f64 * test_fraction).round() as usize;
            let rest = class.split_off(n_test);
            test.extend(class);
            train.extend(rest);
        }

        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        Ok((InjuryDataset::new(train), InjuryDataset::new(test)))
    }

    /// Sample with replacement to the same size (one bagging draw)
    pub fn bootstrap<R: Rng>(&self, rng: &mut R) -> Self {
        let n = self.samples.len();
        if n == 0 {
            return Self::default();
        }
        let samples = (0..n)
            .map(|_| self.samples[rng.gen_range(0..n)].clone())
            .collect();
        InjuryDataset { samples }
    }
}

impl Dataset<InjurySample> for InjuryDataset {
    fn get(&self, index: usize) -> Option<InjurySample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Batch of normalized samples for training
#[derive(Debug, Clone)]
pub struct InjuryBatch<B: Backend> {
    /// Normalized features: [batch, DIM]
    pub features: Tensor<B, 2>,
    /// Injury labels (1.0 = injured): [batch, 1]
    pub targets: Tensor<B, 2>,
}

/// Batcher applying feature normalization while building tensors
#[derive(Clone)]
pub struct InjuryBatcher {
    normalization: FeatureNormalization,
}

impl InjuryBatcher {
    pub fn new(normalization: FeatureNormalization) -> Self {
        InjuryBatcher { normalization }
    }
}

impl<B: Backend> Batcher<B, InjurySample, InjuryBatch<B>> for InjuryBatcher {
    fn batch(&self, items: Vec<InjurySample>, device: &B::Device) -> InjuryBatch<B> {
        let batch_size = items.len();

        let mut feature_data = Vec::with_capacity(batch_size * FeatureVector::DIM);
        let mut target_data = Vec::with_capacity(batch_size);

        for sample in &items {
            let raw = sample.features.to_array();
            let normalized = self
                .normalization
                .apply(&raw)
                .unwrap_or_else(|| raw.to_vec());
            feature_data.extend(normalized.into_iter().map(|v| v as f32));
            target_data.push(if sample.injured { 1.0f32 } else { 0.0 });
        }

        let features = Tensor::<B, 1>::from_floats(feature_data.as_slice(), device)
            .reshape([batch_size, FeatureVector::DIM]);
        let targets =
            Tensor::<B, 1>::from_floats(target_data.as_slice(), device).reshape([batch_size, 1]);

        InjuryBatch { features, targets }
    }
}
