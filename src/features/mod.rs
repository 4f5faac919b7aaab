//! Feature derivation
//!
//! Converts normalized player inputs into model-ready features.

pub mod derive;
pub mod vector;
pub mod weather;

pub use derive::{DerivedFeatures, FeatureDeriver, PositionProfile};
pub use vector::FeatureVector;
pub use weather::WeatherFactor;
