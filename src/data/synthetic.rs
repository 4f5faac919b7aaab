//! Synthetic player history for offline training
//!
//! Stands in for a real injury database: draws plausible biometric and load
//! values and labels each sample with a rule-based risk score.

use rand::Rng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::data::dataset::{InjuryDataset, InjurySample};
use crate::features::FeatureVector;
use crate::{InjuryError, Result};

/// Samples with a rule-based risk above this are labelled injured
pub const INJURY_THRESHOLD: f64 = 0.35;

fn normal(mean: f64, std: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std)
        .map_err(|e| InjuryError::Training(format!("Invalid distribution N({}, {}): {}", mean, std, e)))
}

/// Rule-based risk used to label synthetic samples
pub fn rule_based_risk(features: &FeatureVector) -> f64 {
    let mut risk = 0.1;

    if features.heart_rate_variability < 50.0 {
        risk += 0.2;
    }
    if features.sleep_quality < 5.0 {
        risk += 0.15;
    }
    if features.fatigue_level > 6.0 {
        risk += 0.15;
    }
    if features.training_load > 550.0 {
        risk += 0.2;
    }
    if features.session_intensity > 8.0 {
        risk += 0.1;
    }
    if features.previous_injuries_count > 1.0 {
        risk += 0.1;
    }
    if features.days_since_last_injury < 30.0 {
        risk += 0.1;
    }

    risk
}

/// Generate `n_samples` labelled players from a fixed seed
pub fn generate_training_data(n_samples: usize, seed: u64) -> Result<InjuryDataset> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let height = normal(180.0, 8.0)?;
    let weight = normal(75.0, 10.0)?;
    let hrv = normal(65.0, 15.0)?;
    let sleep = normal(7.0, 2.0)?;
    let fatigue = normal(4.0, 2.0)?;
    let training_load = normal(400.0, 150.0)?;
    let intensity = normal(6.0, 2.0)?;
    let match_minutes = normal(70.0, 25.0)?;

    let mut samples = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let height_cm = height.sample(&mut rng);
        let weight_kg = weight.sample(&mut rng);

        let features = FeatureVector {
            age: rng.gen_range(18..35) as f64,
            height_cm,
            weight_kg,
            bmi: weight_kg / (height_cm / 100.0).powi(2),
            heart_rate_variability: hrv.sample(&mut rng),
            sleep_quality: sleep.sample(&mut rng),
            fatigue_level: fatigue.sample(&mut rng),
            training_load: training_load.sample(&mut rng),
            session_intensity: intensity.sample(&mut rng),
            match_minutes: match_minutes.sample(&mut rng),
            previous_injuries_count: rng.gen_range(0..3) as f64,
            days_since_last_injury: rng.gen_range(0..365) as f64,
        };

        let injured = rule_based_risk(&features) > INJURY_THRESHOLD;
        samples.push(InjurySample { features, injured });
    }

    log::debug!(
        "Generated {} synthetic samples ({} injured)",
        samples.len(),
        samples.iter().filter(|s| s.injured).count()
    );

    Ok(InjuryDataset::new(samples))
}
