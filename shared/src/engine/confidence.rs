//! Confidence scoring for yield estimates

use serde::{Deserialize, Serialize};

use crate::models::FactorScores;

/// Tunable bands for the confidence heuristic
///
/// The defaults reproduce the platform's published scoring; they are plain
/// tuning constants and can be overridden per deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfidencePolicy {
    pub base: f64,
    /// Record counts strictly above this earn the full history bonus
    pub rich_history_records: u32,
    pub rich_history_bonus: f64,
    pub some_history_bonus: f64,
    /// Average factor strictly above this is considered near-optimal
    pub favorable_factor: f64,
    pub favorable_bonus: f64,
    /// Average factor strictly above this (and up to `favorable_factor`) is fair
    pub fair_factor: f64,
    pub fair_bonus: f64,
    /// Average factor strictly below this is penalised
    pub poor_factor: f64,
    pub poor_penalty: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            base: 0.5,
            rich_history_records: 5,
            rich_history_bonus: 0.2,
            some_history_bonus: 0.1,
            favorable_factor: 0.9,
            favorable_bonus: 0.2,
            fair_factor: 0.7,
            fair_bonus: 0.1,
            poor_factor: 0.5,
            poor_penalty: 0.1,
            floor: 0.3,
            ceiling: 0.95,
        }
    }
}

impl ConfidencePolicy {
    /// Confidence in [floor, ceiling] for an estimate
    pub fn score(&self, scores: &FactorScores, record_count: u32) -> f64 {
        let mut confidence = self.base;

        if record_count > self.rich_history_records {
            confidence += self.rich_history_bonus;
        } else if record_count > 0 {
            confidence += self.some_history_bonus;
        }

        let avg = scores.average_factor();
        if avg > self.favorable_factor {
            confidence += self.favorable_bonus;
        } else if avg > self.fair_factor {
            confidence += self.fair_bonus;
        } else if avg < self.poor_factor {
            confidence -= self.poor_penalty;
        }

        confidence.min(self.ceiling).max(self.floor)
    }

    /// Confidence as an integer percentage
    pub fn percent(&self, scores: &FactorScores, record_count: u32) -> u8 {
        confidence_percent(self.score(scores, record_count))
    }
}

/// Convert a [0, 1] confidence into a rounded integer percentage
pub fn confidence_percent(confidence: f64) -> u8 {
    (confidence * 100.0).round().clamp(0.0, 100.0) as u8
}
