//! Player input → feature vector
//!
//! Maps the loosely-specified 0-1 client scales onto the ranges the classifier
//! was trained on. Physical attributes that clients do not send are estimated
//! from the playing position.

use crate::features::vector::FeatureVector;
use crate::features::weather::WeatherFactor;
use crate::{PlayerInput, Position};

/// Estimated physical attributes for a position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionProfile {
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl PositionProfile {
    /// Profile used for positions outside the known vocabulary
    pub const DEFAULT: PositionProfile = PositionProfile {
        height_cm: 180.0,
        weight_kg: 75.0,
    };

    pub fn for_position(position: Option<Position>) -> Self {
        match position {
            Some(Position::Goalkeeper) => PositionProfile {
                height_cm: 190.0,
                weight_kg: 85.0,
            },
            Some(Position::Defender) => PositionProfile {
                height_cm: 183.0,
                weight_kg: 78.0,
            },
            Some(Position::Midfielder) => PositionProfile {
                height_cm: 178.0,
                weight_kg: 72.0,
            },
            Some(Position::Forward) | None => Self::DEFAULT,
        }
    }

    pub fn bmi(&self) -> f64 {
        self.weight_kg / (self.height_cm / 100.0).powi(2)
    }
}

/// Output of the deriver: the classifier vector plus the weather side product
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
    pub vector: FeatureVector,
    pub weather_factor: WeatherFactor,
}

/// Stateless feature derivation
pub struct FeatureDeriver;

impl FeatureDeriver {
    pub fn derive(input: &PlayerInput) -> DerivedFeatures {
        let profile = PositionProfile::for_position(Position::from_name(&input.position));

        let matches = input.matches_played.max(1) as f64;
        let match_minutes = (input.total_minutes_played / matches).min(90.0);

        let vector = FeatureVector {
            age: input.age as f64,
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            bmi: profile.bmi(),
            // Real HRV range is roughly 40-100; fitter players sit higher
            heart_rate_variability: 50.0 + input.fitness_score * 30.0,
            sleep_quality: sleep_quality(input.recovery_time),
            fatigue_level: input.fatigue_level * 10.0,
            training_load: 200.0 + input.training_load * 400.0,
            session_intensity: input.training_load * 10.0,
            match_minutes,
            previous_injuries_count: input.previous_injuries_count as f64,
            days_since_last_injury: days_since_last_injury(input.previous_injuries_count),
        };

        DerivedFeatures {
            vector,
            weather_factor: WeatherFactor::from_condition(&input.weather_condition),
        }
    }
}

/// Step function of rest hours
fn sleep_quality(recovery_hours: f64) -> f64 {
    if recovery_hours >= 72.0 {
        9.0
    } else if recovery_hours >= 48.0 {
        7.5
    } else if recovery_hours >= 24.0 {
        6.0
    } else {
        4.0
    }
}

/// More injuries are read as a more recent one, floored at 30 days
fn days_since_last_injury(injury_count: u32) -> f64 {
    if injury_count == 0 {
        365.0
    } else {
        (365.0 - injury_count as f64 * 60.0).max(30.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_midfielder_scenario() {
        let derived = FeatureDeriver::derive(&midfielder());
        let v = derived.vector;

        assert_eq!(v.age, 25.0);
        assert_eq!(v.height_cm, 178.0);
        assert_eq!(v.weight_kg, 72.0);
        assert_eq!(v.sleep_quality, 7.5);
        assert_eq!(v.match_minutes, 90.0);
        assert_eq!(v.days_since_last_injury, 365.0);
        assert_eq!(v.fatigue_level, 5.0);
        assert_eq!(v.training_load, 400.0);
        assert_eq!(v.session_intensity, 5.0);
        assert_eq!(v.heart_rate_variability, 50.0 + 0.8 * 30.0);
        assert_eq!(derived.weather_factor, WeatherFactor(1.0));
    }

    #[test]
    fn test_bmi_per_position() {
        for (name, height, weight) in [
            ("goalkeeper", 190.0, 85.0),
            ("defender", 183.0, 78.0),
            ("midfielder", 178.0, 72.0),
            ("forward", 180.0, 75.0),
            ("sweeper", 180.0, 75.0),
        ] {
            let input = PlayerInput {
                position: name.to_string(),
                ..midfielder()
            };
            let v = FeatureDeriver::derive(&input).vector;
            assert_eq!(v.height_cm, height, "{}", name);
            assert_eq!(v.weight_kg, weight, "{}", name);
            assert_eq!(v.bmi, weight / (height / 100.0f64).powi(2), "{}", name);
        }
    }

    #[test]
    fn test_position_case_insensitive() {
        let input = PlayerInput {
            position: "GOALKEEPER".to_string(),
            ..midfielder()
        };
        assert_eq!(FeatureDeriver::derive(&input).vector.height_cm, 190.0);
    }

    #[test]
    fn test_days_since_injury() {
        assert_eq!(days_since_last_injury(0), 365.0);
        assert_eq!(days_since_last_injury(3), 185.0);
        assert_eq!(days_since_last_injury(6), 30.0);
        assert_eq!(days_since_last_injury(20), 30.0);
    }

    #[test]
    fn test_sleep_quality_steps() {
        assert_eq!(sleep_quality(96.0), 9.0);
        assert_eq!(sleep_quality(72.0), 9.0);
        assert_eq!(sleep_quality(60.0), 7.5);
        assert_eq!(sleep_quality(24.0), 6.0);
        assert_eq!(sleep_quality(12.0), 4.0);
        assert_eq!(sleep_quality(0.0), 4.0);
    }

    #[test]
    fn test_zero_matches_coerced() {
        let input = PlayerInput {
            matches_played: 0,
            total_minutes_played: 45.0,
            ..midfielder()
        };
        assert_eq!(FeatureDeriver::derive(&input).vector.match_minutes, 45.0);
    }

    #[test]
    fn test_match_minutes_capped() {
        let input = PlayerInput {
            matches_played: 2,
            total_minutes_played: 240.0,
            ..midfielder()
        };
        assert_eq!(FeatureDeriver::derive(&input).vector.match_minutes, 90.0);
    }

    #[test]
    fn test_rain_weather_factor() {
        let input = PlayerInput {
            weather_condition: "heavy rain".to_string(),
            ..midfielder()
        };
        assert_eq!(FeatureDeriver::derive(&input).weather_factor, WeatherFactor(1.2));
    }

    #[test]
    fn test_deterministic() {
        let input = PlayerInput {
            fatigue_level: 0.37,
            training_load: 0.91,
            fitness_score: 0.13,
            ..midfielder()
        };
        let a = FeatureDeriver::derive(&input).vector.to_array();
        let b = FeatureDeriver::derive(&input).vector.to_array();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }
}
