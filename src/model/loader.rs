//! Classifier loading
//!
//! The artifact is read once at startup; afterwards the same `Arc` is handed to
//! every predictor.

use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use crate::model::ensemble::EnsembleClassifier;
use crate::training::train_synthetic;
use crate::{Config, InjuryError, Result};

/// Read the persisted classifier artifact
pub fn load_classifier(path: impl AsRef<Path>) -> Result<EnsembleClassifier> {
    EnsembleClassifier::load(path)
}

/// Load the configured artifact, training and saving one first if it is
/// missing and `train_if_missing` is set
pub fn load_or_train(config: &Config) -> Result<EnsembleClassifier> {
    let path = Path::new(&config.model.artifact_path);

    match load_classifier(path) {
        Ok(classifier) => Ok(classifier),
        Err(InjuryError::ModelUnavailable(reason)) if config.model.train_if_missing && !path.exists() => {
            log::info!("{}; training a new classifier", reason);
            let (classifier, report) = train_synthetic(&config.training)?;
            log::info!("Trained classifier with accuracy {:.3}", report.accuracy);
            classifier.save(path)?;
            Ok(classifier)
        }
        Err(e) => Err(e),
    }
}

/// Process-wide holder that loads the classifier at most once
pub struct ClassifierSlot {
    config: Config,
    cell: OnceLock<Arc<EnsembleClassifier>>,
    /// Serializes first loads so concurrent callers never train twice
    load_lock: Mutex<()>,
}

impl ClassifierSlot {
    pub fn new(config: Config) -> Self {
        ClassifierSlot {
            config,
            cell: OnceLock::new(),
            load_lock: Mutex::new(()),
        }
    }

    /// Return the loaded classifier, loading it on first use.
    ///
    /// Failures leave the slot empty so a later call can retry; once a load
    /// succeeds further calls never touch storage again.
    pub fn get_or_load(&self) -> Result<Arc<EnsembleClassifier>> {
        if let Some(classifier) = self.cell.get() {
            return Ok(Arc::clone(classifier));
        }

        // A poisoned lock only means another loader panicked; the cell is still consistent
        let _guard = self
            .load_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(classifier) = self.cell.get() {
            return Ok(Arc::clone(classifier));
        }

        let loaded = Arc::new(load_or_train(&self.config)?);
        Ok(Arc::clone(self.cell.get_or_init(|| loaded)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureNormalization;
    use crate::features::FeatureVector;
    use crate::model::ensemble::LogisticMember;
    use tempfile::TempDir;

    /// Slot reading a fixed artifact path without a training fallback
    fn slot_for(path: impl AsRef<Path>) -> ClassifierSlot {
        let mut config = Config::default();
        config.model.artifact_path = path.as_ref().to_string_lossy().into_owned();
        ClassifierSlot::new(config)
    }

    fn tiny_classifier() -> EnsembleClassifier {
        EnsembleClassifier::new(
            FeatureNormalization {
                mean: vec![0.0; FeatureVector::DIM],
                std: vec![1.0; FeatureVector::DIM],
            },
            vec![LogisticMember {
                weights: vec![0.1; FeatureVector::DIM],
                bias: 0.0,
            }],
        )
    }

    #[test]
    fn test_missing_artifact_without_training() {
        let dir = TempDir::new().unwrap();
        let slot = slot_for(dir.path().join("missing.json"));

        assert!(matches!(
            slot.get_or_load(),
            Err(InjuryError::ModelUnavailable(_))
        ));
        assert!(slot.cell.get().is_none());
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        tiny_classifier().save(&path).unwrap();

        let slot = slot_for(&path);
        let first = slot.get_or_load().unwrap();

        // Removing the artifact proves the second call does not read storage
        std::fs::remove_file(&path).unwrap();
        let second = slot.get_or_load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(slot.cell.get().is_some());
    }

    #[test]
    fn test_train_if_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trained.json");

        let mut config = Config::default();
        config.model.artifact_path = path.to_string_lossy().into_owned();
        config.model.train_if_missing = true;
        config.training.samples = 300;
        config.training.estimators = 2;
        config.training.epochs = 50;

        let classifier = load_or_train(&config).unwrap();
        assert_eq!(classifier.member_count(), 2);
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_artifact_is_not_retrained() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.json");
        std::fs::write(&path, "not json").unwrap();

        let mut config = Config::default();
        config.model.artifact_path = path.to_string_lossy().into_owned();
        config.model.train_if_missing = true;

        assert!(matches!(
            load_or_train(&config),
            Err(InjuryError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_concurrent_first_load_trains_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shared.json");

        let mut config = Config::default();
        config.model.artifact_path = path.to_string_lossy().into_owned();
        config.model.train_if_missing = true;
        config.training.samples = 200;
        config.training.estimators = 1;
        config.training.epochs = 20;

        let slot = ClassifierSlot::new(config);
        let barrier = std::sync::Barrier::new(4);
        let loaded: Vec<Arc<EnsembleClassifier>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        slot.get_or_load().unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(loaded.iter().all(|c| Arc::ptr_eq(c, &loaded[0])));
        // A second training run would have rewritten the artifact with a later timestamp
        let on_disk = load_classifier(&path).unwrap();
        assert_eq!(on_disk.trained_at(), loaded[0].trained_at());
    }
}
