//! Bagged logistic ensemble and its persisted artifact

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::FeatureNormalization;
use crate::features::FeatureVector;
use crate::model::classifier::{Classifier, FeatureImportances};
use crate::{InjuryError, Result};

/// Bumped whenever the artifact layout changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Weights of one ensemble member over normalized features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticMember {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogisticMember {
    fn logit(&self, normalized: &[f64]) -> Option<f64> {
        if self.weights.len() != normalized.len() {
            return None;
        }
        let z = self
            .weights
            .iter()
            .zip(normalized)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        Some(z)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Ensemble classifier loaded once and shared read-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleClassifier {
    format_version: u32,
    trained_at: DateTime<Utc>,
    feature_names: Vec<String>,
    normalization: FeatureNormalization,
    members: Vec<LogisticMember>,
    accuracy: Option<f64>,
}

impl EnsembleClassifier {
    /// Build an ensemble over `FeatureVector` in its canonical order
    pub fn new(normalization: FeatureNormalization, members: Vec<LogisticMember>) -> Self {
        EnsembleClassifier {
            format_version: ARTIFACT_FORMAT_VERSION,
            trained_at: Utc::now(),
            feature_names: FeatureVector::names(),
            normalization,
            members,
            accuracy: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[LogisticMember] {
        &self.members
    }

    /// Save the artifact as JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!(
            "Saved classifier ({} members) to {}",
            self.members.len(),
            path.display()
        );
        Ok(())
    }

    /// Load an artifact; anything unreadable counts as an unavailable model
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InjuryError::ModelUnavailable(format!(
                "no classifier artifact at {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            InjuryError::ModelUnavailable(format!("failed to read {}: {}", path.display(), e))
        })?;
        let classifier: EnsembleClassifier = serde_json::from_str(&content).map_err(|e| {
            InjuryError::ModelUnavailable(format!("failed to parse {}: {}", path.display(), e))
        })?;

        if classifier.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(InjuryError::ModelUnavailable(format!(
                "artifact {} has format version {}, expected {}",
                path.display(),
                classifier.format_version,
                ARTIFACT_FORMAT_VERSION
            )));
        }

        log::info!(
            "Loaded classifier from {} ({} members, accuracy {})",
            path.display(),
            classifier.members.len(),
            classifier
                .accuracy
                .map(|a| format!("{:.3}", a))
                .unwrap_or_else(|| "unknown".to_string())
        );

        Ok(classifier)
    }

    fn normalized(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        self.normalization.apply(&features.to_array()).ok_or_else(|| {
            InjuryError::InferenceFailure(format!(
                "normalization covers {} features, vector has {}",
                self.normalization.dim(),
                FeatureVector::DIM
            ))
        })
    }
}

impl Classifier for EnsembleClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_probability(&self, features: &FeatureVector) -> Result<f64> {
        if self.members.is_empty() {
            return Err(InjuryError::InferenceFailure(
                "ensemble has no members".to_string(),
            ));
        }

        let x = self.normalized(features)?;
        let mut total = 0.0;
        for (i, member) in self.members.iter().enumerate() {
            let z = member.logit(&x).ok_or_else(|| {
                InjuryError::InferenceFailure(format!(
                    "member {} has {} weights for {} features",
                    i,
                    member.weights.len(),
                    x.len()
                ))
            })?;
            total += sigmoid(z);
        }

        let probability = total / self.members.len() as f64;
        if !probability.is_finite() {
            return Err(InjuryError::InferenceFailure(format!(
                "non-finite probability {}",
                probability
            )));
        }
        Ok(probability)
    }

    /// Majority vote over the members that still produce a finite logit
    fn predict_class(&self, features: &FeatureVector) -> Result<bool> {
        let x = self.normalized(features)?;

        let votes: Vec<bool> = self
            .members
            .iter()
            .filter_map(|m| m.logit(&x))
            .filter(|z| z.is_finite())
            .map(|z| z >= 0.0)
            .collect();

        if votes.is_empty() {
            return Err(InjuryError::InferenceFailure(
                "no ensemble member produced a usable vote".to_string(),
            ));
        }

        let positive = votes.iter().filter(|v| **v).count();
        Ok(positive * 2 > votes.len())
    }

    /// Mean absolute standardized coefficient per feature, summing to 1
    fn feature_importances(&self) -> FeatureImportances {
        let mut totals = vec![0.0f64; self.feature_names.len()];
        let mut counted = 0usize;

        for member in &self.members {
            if member.weights.len() != totals.len() || member.weights.iter().any(|w| !w.is_finite()) {
                continue;
            }
            for (t, w) in totals.iter_mut().zip(&member.weights) {
                *t += w.abs();
            }
            counted += 1;
        }

        let sum: f64 = totals.iter().sum();
        if counted == 0 || sum <= 0.0 {
            return FeatureImportances::new();
        }

        self.feature_names
            .iter()
            .cloned()
            .zip(totals.into_iter().map(|t| t / sum))
            .collect()
    }
}
