//! Weather adjustment of the raw injury probability

/// Upper bound on any adjusted risk
pub const RISK_CAP: f64 = 0.95;

/// Multiplicative risk adjustment parsed from free-text weather
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherFactor(pub f64);

impl WeatherFactor {
    pub const NEUTRAL: WeatherFactor = WeatherFactor(1.0);

    /// Rain or wet pitches raise risk the most, heat or extreme conditions moderately
    pub fn from_condition(condition: &str) -> Self {
        let weather = condition.to_lowercase();
        if weather.contains("rain") || weather.contains("wet") {
            WeatherFactor(1.2)
        } else if weather.contains("hot") || weather.contains("extreme") {
            WeatherFactor(1.1)
        } else {
            Self::NEUTRAL
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for WeatherFactor {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Scale a raw probability by the weather factor, capped at `RISK_CAP`
pub fn adjust(raw_probability: f64, weather_factor: f64) -> f64 {
    (raw_probability * weather_factor).min(RISK_CAP)
}
