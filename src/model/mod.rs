//! Risk classifier
//!
//! - `Classifier`: capability the predictor depends on
//! - `EnsembleClassifier`: bagged logistic members, persisted as JSON
//! - `LogisticHead`: burn module each member is trained as

pub mod classifier;
pub mod ensemble;
pub mod loader;
pub mod logistic;

pub use classifier::{Classifier, FeatureImportances};
pub use ensemble::{EnsembleClassifier, LogisticMember};
pub use loader::{load_classifier, load_or_train, ClassifierSlot};
pub use logistic::LogisticHead;
