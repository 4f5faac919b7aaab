//! Model training
//!
//! Offline maintenance path: synthetic data, ensemble fitting and evaluation.

pub mod metrics;
pub mod trainer;

pub use metrics::{Metrics, TrainingHistory};
pub use trainer::{evaluate, train_classifier, train_synthetic, EnsembleTrainer, TrainingReport};
