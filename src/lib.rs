//! Football injury risk prediction
//!
//! Derives a fixed-order feature vector from normalized player inputs, scores it
//! with a trained ensemble classifier and explains the result.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;
pub mod training;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Playing position used to pick a physical profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub fn name(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "goalkeeper",
            Position::Defender => "defender",
            Position::Midfielder => "midfielder",
            Position::Forward => "forward",
        }
    }

    /// Case-insensitive lookup; anything outside the vocabulary is `None`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "goalkeeper" => Some(Position::Goalkeeper),
            "defender" => Some(Position::Defender),
            "midfielder" => Some(Position::Midfielder),
            "forward" => Some(Position::Forward),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Caller-supplied player record with normalized ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerInput {
    /// Age in years
    pub age: u32,
    /// Free-text position, matched case-insensitively
    pub position: String,
    /// Fatigue on a 0-1 scale
    pub fatigue_level: f64,
    /// Training load on a 0-1 scale
    pub training_load: f64,
    /// Hours since the last session
    pub recovery_time: f64,
    /// Fitness on a 0-1 scale
    pub fitness_score: f64,
    /// Matches played (0 is treated as 1)
    pub matches_played: u32,
    pub total_minutes_played: f64,
    pub previous_injuries_count: u32,
    pub weather_condition: String,
}

impl Default for PlayerInput {
    fn default() -> Self {
        PlayerInput {
            age: 25,
            position: "midfielder".to_string(),
            fatigue_level: 0.5,
            training_load: 0.5,
            recovery_time: 48.0,
            fitness_score: 0.8,
            matches_played: 1,
            total_minutes_played: 0.0,
            previous_injuries_count: 0,
            weather_condition: "normal".to_string(),
        }
    }
}

impl PlayerInput {
    /// Range checks performed by the request layer before calling the predictor
    pub fn validate(&self) -> Result<()> {
        if self.age > 100 {
            return Err(InjuryError::InvalidInput(format!(
                "age must be at most 100, got {}",
                self.age
            )));
        }

        let unit_fields = [
            ("fatigue_level", self.fatigue_level),
            ("training_load", self.training_load),
            ("fitness_score", self.fitness_score),
        ];
        for (name, value) in unit_fields {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(InjuryError::InvalidInput(format!(
                    "{} must be within 0-1, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("recovery_time", self.recovery_time),
            ("total_minutes_played", self.total_minutes_played),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(InjuryError::InvalidInput(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Coarse risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const MEDIUM_THRESHOLD: f64 = 0.3;
    pub const HIGH_THRESHOLD: f64 = 0.7;

    /// Bucket a risk score: low < 0.3 <= medium < 0.7 <= high
    pub fn from_score(score: f64) -> Self {
        if score < Self::MEDIUM_THRESHOLD {
            RiskLevel::Low
        } else if score < Self::HIGH_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// A feature flagged as a top contributor to a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFactor {
    pub name: String,
    pub importance: f64,
    pub current_value: f64,
    pub description: String,
}

/// Predictor output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Weather-adjusted probability, capped at 0.95
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    /// At most three factors, strongest first
    pub key_factors: Vec<KeyFactor>,
    pub recommendations: Vec<String>,
    /// Set when the probability came from the binary-vote fallback
    #[serde(default)]
    pub degraded: bool,
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum InjuryError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Inference failed: {0}")]
    InferenceFailure(String),

    #[error("Classifier features {found:?} do not match expected order {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl InjuryError {
    /// True for failures caused by the caller's data rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, InjuryError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, InjuryError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub artifact_path: String,
    /// Train and save a classifier when the artifact is missing
    pub train_if_missing: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            artifact_path: "model/injury_model.json".to_string(),
            train_if_missing: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of synthetic samples to generate
    pub samples: usize,
    /// Bagged members in the ensemble
    pub estimators: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            samples: 1500,
            estimators: 10,
            epochs: 300,
            learning_rate: 0.5,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InjuryError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| InjuryError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| InjuryError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
