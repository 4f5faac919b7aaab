//! Key-factor explanations for a prediction

use crate::features::FeatureVector;
use crate::model::FeatureImportances;
use crate::KeyFactor;

/// Number of factors reported per prediction
pub const MAX_FACTORS: usize = 3;

/// Rank features by importance and describe the strongest ones.
///
/// `names` gives the positional meaning of the vector's values. Ties keep the
/// feature order.
pub fn explain(
    vector: &FeatureVector,
    importances: &FeatureImportances,
    names: &[String],
) -> Vec<KeyFactor> {
    if importances.is_empty() {
        return Vec::new();
    }

    let values = vector.to_array();
    let mut ranked: Vec<(&str, f64, f64)> = names
        .iter()
        .zip(values)
        .filter_map(|(name, value)| {
            importances
                .get(name)
                .map(|weight| (name.as_str(), *weight, value))
        })
        .collect();

    // sort_by is stable, so equal weights stay in feature order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(MAX_FACTORS)
        .map(|(name, importance, value)| KeyFactor {
            name: name.to_string(),
            importance,
            current_value: value,
            description: describe_factor(name, value),
        })
        .collect()
}

/// Human-readable description of a feature value
pub fn describe_factor(name: &str, value: f64) -> String {
    match name {
        "training_load" => format!(
            "Training load is {}",
            if value > 500.0 {
                "very high"
            } else if value > 400.0 {
                "high"
            } else if value > 300.0 {
                "moderate"
            } else {
                "low"
            }
        ),
        "sleep_quality" => format!(
            "Sleep quality is {}",
            if value > 8.0 {
                "excellent"
            } else if value > 6.0 {
                "good"
            } else {
                "poor"
            }
        ),
        "heart_rate_variability" => format!(
            "HRV indicates {} recovery",
            if value > 75.0 {
                "excellent"
            } else if value > 65.0 {
                "good"
            } else if value > 55.0 {
                "moderate"
            } else {
                "poor"
            }
        ),
        "fatigue_level" => format!(
            "Fatigue level is {}",
            if value > 8.0 {
                "very high"
            } else if value > 6.0 {
                "high"
            } else if value > 4.0 {
                "moderate"
            } else {
                "low"
            }
        ),
        "previous_injuries_count" => format!("Player has {} previous injuries", value as i64),
        "recovery_time" => format!(
            "Recovery time is {}",
            if value > 72.0 {
                "optimal"
            } else if value > 48.0 {
                "good"
            } else {
                "insufficient"
            }
        ),
        "fitness_score" => format!(
            "Fitness score is {}",
            if value > 0.8 {
                "excellent"
            } else if value > 0.6 {
                "good"
            } else {
                "average"
            }
        ),
        "age" => format!("Player age is {} years", value as i64),
        "session_intensity" => format!(
            "Session intensity is {}",
            if value > 8.0 {
                "very high"
            } else if value > 6.0 {
                "high"
            } else {
                "moderate"
            }
        ),
        "match_minutes" => format!("Average match minutes is {:.1}", value),
        _ => format!("{} is {:.1}", name, value),
    }
}
