//! Classifier capability used by the predictor

use std::collections::HashMap;

use crate::features::FeatureVector;
use crate::Result;

/// Per-feature importance weights keyed by feature name
pub type FeatureImportances = HashMap<String, f64>;

/// A trained binary classifier over `FeatureVector`s.
///
/// Implementations are loaded once and shared read-only, so every method takes
/// `&self` and must be safe to call from many threads at once.
pub trait Classifier: Send + Sync {
    /// Feature names in the positional order the classifier was trained on
    fn feature_names(&self) -> &[String];

    /// Probability of the positive (injury) class, in [0, 1]
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64>;

    /// Coarse yes/no prediction without calibration
    fn predict_class(&self, features: &FeatureVector) -> Result<bool>;

    /// Importance per feature; empty when the classifier cannot provide them
    fn feature_importances(&self) -> FeatureImportances {
        FeatureImportances::new()
    }
}
