//! Fixed-order feature vector consumed by the classifier

use serde::{Deserialize, Serialize};

/// Derived player attributes in classifier training order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub age: f64,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub bmi: f64,
    pub heart_rate_variability: f64,
    /// Sleep quality on a 0-10 scale
    pub sleep_quality: f64,
    /// Fatigue on a 0-10 scale
    pub fatigue_level: f64,
    /// Training load in 200-600 units
    pub training_load: f64,
    pub session_intensity: f64,
    /// Average minutes per match, capped at 90
    pub match_minutes: f64,
    pub previous_injuries_count: f64,
    pub days_since_last_injury: f64,
}

impl FeatureVector {
    /// Dimension of feature vector
    pub const DIM: usize = 12;

    /// Feature names, index-aligned with `to_array`
    pub const NAMES: [&'static str; Self::DIM] = [
        "age",
        "height_cm",
        "weight_kg",
        "bmi",
        "heart_rate_variability",
        "sleep_quality",
        "fatigue_level",
        "training_load",
        "session_intensity",
        "match_minutes",
        "previous_injuries_count",
        "days_since_last_injury",
    ];

    pub fn names() -> Vec<String> {
        Self::NAMES.iter().map(|n| n.to_string()).collect()
    }

    /// Convert to a flat array in `NAMES` order
    pub fn to_array(&self) -> [f64; Self::DIM] {
        [
            self.age,
            self.height_cm,
            self.weight_kg,
            self.bmi,
            self.heart_rate_variability,
            self.sleep_quality,
            self.fatigue_level,
            self.training_load,
            self.session_intensity,
            self.match_minutes,
            self.previous_injuries_count,
            self.days_since_last_injury,
        ]
    }

    /// Create from a flat slice in `NAMES` order
    pub fn from_slice(v: &[f64]) -> Option<Self> {
        if v.len() != Self::DIM {
            return None;
        }
        Some(FeatureVector {
            age: v[0],
            height_cm: v[1],
            weight_kg: v[2],
            bmi: v[3],
            heart_rate_variability: v[4],
            sleep_quality: v[5],
            fatigue_level: v[6],
            training_load: v[7],
            session_intensity: v[8],
            match_minutes: v[9],
            previous_injuries_count: v[10],
            days_since_last_injury: v[11],
        })
    }

    /// Value of a named feature
    pub fn get(&self, name: &str) -> Option<f64> {
        Self::NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.to_array()[i])
    }

    /// Name of the first non-finite feature, if any
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.to_array()
            .iter()
            .zip(Self::NAMES)
            .find(|(v, _)| !v.is_finite())
            .map(|(_, name)| name)
    }
}
