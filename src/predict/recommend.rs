//! Rule-based recommendations

use crate::{PlayerInput, RiskLevel};

/// Baseline advice per risk level, then additions driven by the normalized
/// input (not the derived feature vector)
pub fn recommendations(level: RiskLevel, input: &PlayerInput) -> Vec<String> {
    let baseline: [&str; 3] = match level {
        RiskLevel::High => [
            "Immediate workload reduction and individualized recovery plan.",
            "Schedule medical screening before next fixture.",
            "Limit high-intensity drills for the next 72 hours.",
        ],
        RiskLevel::Medium => [
            "Increase focus on recovery protocols (sleep, nutrition).",
            "Monitor training load and reduce intensity spikes.",
            "Add additional mobility and stability sessions.",
        ],
        RiskLevel::Low => [
            "Maintain current training plan.",
            "Continue monitoring key wellness metrics.",
            "Plan progressive overload cautiously.",
        ],
    };

    let mut advice: Vec<String> = baseline.iter().map(|s| s.to_string()).collect();

    if input.fatigue_level > 0.7 {
        advice.push("Fatigue readings are high: schedule active recovery or rest day.".to_string());
    }
    if input.recovery_time < 24.0 {
        advice.push(
            "Recovery time under 24h detected: increase rest before next session.".to_string(),
        );
    }
    if input.training_load > 0.75 {
        advice.push("Training load trending high: consider tapering sessions.".to_string());
    }

    advice
}
