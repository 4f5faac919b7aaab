//! Prediction and inference
//!
//! Compose a loaded classifier with feature derivation, weather adjustment,
//! explanations and recommendations.

pub mod explain;
pub mod inference;
pub mod recommend;

pub use explain::{describe_factor, explain};
pub use inference::{format_prediction, RiskPredictor};
pub use recommend::recommendations;
