//! Risk prediction for a single player

use std::sync::Arc;

use crate::features::{weather, FeatureDeriver, FeatureVector};
use crate::model::{Classifier, FeatureImportances};
use crate::predict::explain::explain;
use crate::predict::recommend::recommendations;
use crate::{InjuryError, PlayerInput, PredictionResult, Result, RiskLevel};

/// Upper bound on reported confidence
const CONFIDENCE_CAP: f64 = 0.95;

/// Predictor composing derivation, classification, weather and explanation
pub struct RiskPredictor {
    classifier: Arc<dyn Classifier>,
    /// Cached once; the classifier never changes after load
    importances: FeatureImportances,
}

impl RiskPredictor {
    /// Bind a loaded classifier, checking it was trained on this feature order
    pub fn new(classifier: Arc<dyn Classifier>) -> Result<Self> {
        let found = classifier.feature_names();
        if found.len() != FeatureVector::DIM
            || found.iter().zip(FeatureVector::NAMES).any(|(f, e)| f != e)
        {
            return Err(InjuryError::FeatureMismatch {
                expected: FeatureVector::names(),
                found: found.to_vec(),
            });
        }

        let importances = classifier.feature_importances();
        if importances.is_empty() {
            log::info!("Classifier exposes no feature importances; key factors will be empty");
        }

        Ok(RiskPredictor {
            classifier,
            importances,
        })
    }

    /// Predict injury risk for one player
    pub fn predict(&self, input: &PlayerInput) -> Result<PredictionResult> {
        let derived = FeatureDeriver::derive(input);
        if let Some(name) = derived.vector.first_non_finite() {
            return Err(InjuryError::InvalidInput(format!(
                "derived feature {} is not a finite number",
                name
            )));
        }
        log::debug!("Derived features: {:?}", derived.vector);

        let primary = self
            .classifier
            .predict_probability(&derived.vector)
            .and_then(|p| {
                if p.is_finite() && (0.0..=1.0).contains(&p) {
                    Ok(p)
                } else {
                    Err(InjuryError::InferenceFailure(format!(
                        "classifier returned probability {} outside [0, 1]",
                        p
                    )))
                }
            });

        let (raw_probability, degraded) = match primary {
            Ok(p) => (p, false),
            Err(InjuryError::InferenceFailure(reason)) => {
                log::warn!(
                    "Probability inference failed ({}); using uncalibrated binary prediction",
                    reason
                );
                let positive = self.classifier.predict_class(&derived.vector)?;
                (if positive { 1.0 } else { 0.0 }, true)
            }
            Err(e) => return Err(e),
        };

        let risk_score = weather::adjust(raw_probability, derived.weather_factor.value());
        let risk_level = RiskLevel::from_score(risk_score);
        let confidence = (risk_score * 1.2).min(CONFIDENCE_CAP);

        log::debug!(
            "raw={:.4} weather={:.2} risk={:.4} ({})",
            raw_probability,
            derived.weather_factor.value(),
            risk_score,
            risk_level
        );

        Ok(PredictionResult {
            risk_score,
            risk_level,
            confidence,
            key_factors: explain(
                &derived.vector,
                &self.importances,
                self.classifier.feature_names(),
            ),
            recommendations: recommendations(risk_level, input),
            degraded,
        })
    }

    /// Predict several players; each entry fails independently
    pub fn predict_batch(&self, inputs: &[PlayerInput]) -> Vec<Result<PredictionResult>> {
        inputs.iter().map(|input| self.predict(input)).collect()
    }
}

/// Format a prediction for display
pub fn format_prediction(result: &PredictionResult) -> String {
    let mut out = format!(
        r#"
┌─────────────────────────────────────────────────┐
│  Injury risk assessment
├─────────────────────────────────────────────────┤
│  Risk score:   {:.1}%
│  Risk level:   {}
│  Confidence:   {:.1}%
"#,
        result.risk_score * 100.0,
        result.risk_level,
        result.confidence * 100.0,
    );

    if result.degraded {
        out.push_str("│  (uncalibrated fallback prediction)\n");
    }

    if !result.key_factors.is_empty() {
        out.push_str("├─────────────────────────────────────────────────┤\n");
        out.push_str("│  Key factors:\n");
        for factor in &result.key_factors {
            out.push_str(&format!(
                "│    {} ({:.1}%): {}\n",
                factor.name,
                factor.importance * 100.0,
                factor.description
            ));
        }
    }

    out.push_str("├─────────────────────────────────────────────────┤\n");
    out.push_str("│  Recommendations:\n");
    for advice in &result.recommendations {
        out.push_str(&format!("│    - {}\n", advice));
    }
    out.push_str("└─────────────────────────────────────────────────┘\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Classifier returning a fixed answer
    struct FixedClassifier {
        names: Vec<String>,
        probability: Option<f64>,
        class: bool,
        importances: FeatureImportances,
    }

    impl FixedClassifier {
        fn with_probability(probability: f64) -> Self {
            FixedClassifier {
                names: FeatureVector::names(),
                probability: Some(probability),
                class: false,
                importances: [
                    ("training_load", 0.4),
                    ("fatigue_level", 0.3),
                    ("sleep_quality", 0.2),
                    ("age", 0.1),
                ]
                .iter()
                .map(|(n, w)| (n.to_string(), *w))
                .collect(),
            }
        }

        fn failing(class: bool) -> Self {
            FixedClassifier {
                probability: None,
                class,
                ..Self::with_probability(0.0)
            }
        }
    }

    impl Classifier for FixedClassifier {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict_probability(&self, _features: &FeatureVector) -> Result<f64> {
            self.probability
                .ok_or_else(|| InjuryError::InferenceFailure("shape mismatch".to_string()))
        }

        fn predict_class(&self, _features: &FeatureVector) -> Result<bool> {
            Ok(self.class)
        }

        fn feature_importances(&self) -> FeatureImportances {
            self.importances.clone()
        }
    }

    /// Classifier whose probability path reports a missing model
    struct UnloadedClassifier {
        names: Vec<String>,
    }

    impl Classifier for UnloadedClassifier {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict_probability(&self, _features: &FeatureVector) -> Result<f64> {
            Err(InjuryError::ModelUnavailable("not loaded".to_string()))
        }

        fn predict_class(&self, _features: &FeatureVector) -> Result<bool> {
            Ok(true)
        }
    }

    fn predictor(classifier: impl Classifier + 'static) -> RiskPredictor {
        RiskPredictor::new(Arc::new(classifier)).unwrap()
    }

    fn midfielder() -> PlayerInput {
        PlayerInput {
            age: 25,
            position: "midfielder".to_string(),
            fatigue_level: 0.5,
            training_load: 0.5,
            recovery_time: 48.0,
            fitness_score: 0.8,
            matches_played: 10,
            total_minutes_played: 900.0,
            previous_injuries_count: 0,
            weather_condition: "normal".to_string(),
        }
    }

    #[test]
    fn test_low_risk_prediction() {
        let result = predictor(FixedClassifier::with_probability(0.2))
            .predict(&midfielder())
            .unwrap();

        assert_eq!(result.risk_score, 0.2);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.confidence, 0.2 * 1.2);
        assert_eq!(result.recommendations.len(), 3);
        assert!(!result.degraded);

        assert_eq!(result.key_factors.len(), 3);
        assert_eq!(result.key_factors[0].name, "training_load");
        assert_eq!(result.key_factors[0].current_value, 400.0);
        assert_eq!(result.key_factors[1].name, "fatigue_level");
        assert_eq!(result.key_factors[2].name, "sleep_quality");
        assert_eq!(result.key_factors[2].current_value, 7.5);
    }

    #[test]
    fn test_rain_scales_probability() {
        let rainy = PlayerInput {
            weather_condition: "heavy rain".to_string(),
            ..midfielder()
        };

        let result = predictor(FixedClassifier::with_probability(0.5))
            .predict(&rainy)
            .unwrap();
        assert_eq!(result.risk_score, 0.5 * 1.2);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.confidence, (0.5 * 1.2 * 1.2f64).min(0.95));

        let result = predictor(FixedClassifier::with_probability(0.9))
            .predict(&rainy)
            .unwrap();
        assert_eq!(result.risk_score, 0.95);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_short_recovery_recommendation() {
        let tired = PlayerInput {
            recovery_time: 12.0,
            ..midfielder()
        };
        let result = predictor(FixedClassifier::with_probability(0.4))
            .predict(&tired)
            .unwrap();

        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.starts_with("Recovery time under 24h")));
        let sleep = result
            .key_factors
            .iter()
            .find(|f| f.name == "sleep_quality")
            .unwrap();
        assert_eq!(sleep.current_value, 4.0);
        assert_eq!(sleep.description, "Sleep quality is poor");
    }

    #[test]
    fn test_degraded_fallback() {
        let result = predictor(FixedClassifier::failing(true))
            .predict(&midfielder())
            .unwrap();
        assert!(result.degraded);
        assert_eq!(result.risk_score, 0.95);
        assert_eq!(result.risk_level, RiskLevel::High);

        let result = predictor(FixedClassifier::failing(false))
            .predict(&midfielder())
            .unwrap();
        assert!(result.degraded);
        assert_eq!(result.risk_score, 0.0);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_non_finite_probability_falls_back() {
        let mut classifier = FixedClassifier::with_probability(f64::NAN);
        classifier.class = false;
        let result = predictor(classifier).predict(&midfielder()).unwrap();
        assert!(result.degraded);
        assert_eq!(result.risk_score, 0.0);
        assert_eq!(result.risk_level, RiskLevel::Low);

        let mut classifier = FixedClassifier::with_probability(f64::INFINITY);
        classifier.class = true;
        let result = predictor(classifier).predict(&midfielder()).unwrap();
        assert!(result.degraded);
        assert_eq!(result.risk_score, 0.95);
    }

    #[test]
    fn test_out_of_range_probability_falls_back() {
        for p in [-0.2, 1.5] {
            let result = predictor(FixedClassifier::with_probability(p))
                .predict(&midfielder())
                .unwrap();
            assert!(result.degraded, "probability {} was not flagged", p);
            assert_eq!(result.risk_score, 0.0);
        }
    }

    #[test]
    fn test_model_unavailable_propagates() {
        let p = predictor(UnloadedClassifier {
            names: FeatureVector::names(),
        });
        assert!(matches!(
            p.predict(&midfielder()),
            Err(InjuryError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_no_importances_no_factors() {
        let p = predictor(UnloadedClassifier {
            names: FeatureVector::names(),
        });
        assert!(p.importances.is_empty());

        let mut classifier = FixedClassifier::with_probability(0.1);
        classifier.importances.clear();
        let result = predictor(classifier).predict(&midfielder()).unwrap();
        assert!(result.key_factors.is_empty());
    }

    #[test]
    fn test_feature_order_mismatch_rejected() {
        let mut classifier = FixedClassifier::with_probability(0.1);
        classifier.names.swap(0, 1);
        assert!(matches!(
            RiskPredictor::new(Arc::new(classifier)),
            Err(InjuryError::FeatureMismatch { .. })
        ));

        let mut classifier = FixedClassifier::with_probability(0.1);
        classifier.names.pop();
        assert!(RiskPredictor::new(Arc::new(classifier)).is_err());
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let input = PlayerInput {
            fitness_score: f64::NAN,
            ..midfielder()
        };
        let err = predictor(FixedClassifier::with_probability(0.1))
            .predict(&input)
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_predict_is_idempotent() {
        let p = predictor(FixedClassifier::with_probability(0.33));
        let input = PlayerInput {
            weather_condition: "hot".to_string(),
            ..midfielder()
        };
        assert_eq!(p.predict(&input).unwrap(), p.predict(&input).unwrap());
    }

    #[test]
    fn test_concurrent_predictions() {
        let p = predictor(FixedClassifier::with_probability(0.45));
        let expected = p.predict(&midfielder()).unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| p.predict(&midfielder()).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_batch_fails_independently() {
        let p = predictor(FixedClassifier::with_probability(0.5));
        let bad = PlayerInput {
            training_load: f64::INFINITY,
            ..midfielder()
        };
        let results = p.predict_batch(&[midfielder(), bad]);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_format_prediction() {
        let result = predictor(FixedClassifier::with_probability(0.5))
            .predict(&midfielder())
            .unwrap();
        let text = format_prediction(&result);
        assert!(text.contains("Risk level:   medium"));
        assert!(text.contains("training_load"));
        assert!(text.contains("Monitor training load"));
    }

    proptest! {
        #[test]
        fn test_risk_bounds_and_levels(
            p in 0.0f64..=1.0,
            fatigue in 0.0f64..=1.0,
            load in 0.0f64..=1.0,
            recovery in 0.0f64..200.0,
            weather in prop::sample::select(vec!["normal", "rain", "hot", "wet", "snow"]),
        ) {
            let input = PlayerInput {
                fatigue_level: fatigue,
                training_load: load,
                recovery_time: recovery,
                weather_condition: weather.to_string(),
                ..midfielder()
            };
            let result = predictor(FixedClassifier::with_probability(p)).predict(&input).unwrap();

            prop_assert!(result.risk_score >= 0.0 && result.risk_score <= 0.95);
            prop_assert!(result.confidence <= 0.95);
            prop_assert!(result.key_factors.len() <= 3);
            let expected = if result.risk_score < 0.3 {
                RiskLevel::Low
            } else if result.risk_score < 0.7 {
                RiskLevel::Medium
            } else {
                RiskLevel::High
            };
            prop_assert_eq!(result.risk_level, expected);
        }
    }
}
