//! Training data
//!
//! Labelled datasets, normalization and the synthetic sample generator.

pub mod dataset;
pub mod synthetic;

pub use dataset::{FeatureNormalization, InjuryBatch, InjuryBatcher, InjuryDataset, InjurySample};
pub use synthetic::generate_training_data;
