//! Prediction output models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::CropObservation;

/// Unit reported alongside every yield figure
pub const YIELD_UNIT: &str = "tons per hectare";

/// Description of how estimates are produced
pub const METHODOLOGY: &str =
    "Multi-factor regression model considering rainfall, temperature, soil, and fertilizer factors";

/// Per-request multiplicative factors behind a yield estimate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FactorScores {
    pub base_yield: f64,
    pub rainfall_factor: f64,
    pub temperature_factor: f64,
    pub fertilizer_factor: f64,
    pub soil_factor: f64,
}

/// Advisory priority
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// An actionable advisory attached to a prediction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub category: String,
    pub priority: Priority,
    pub message: String,
    pub impact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Recommendation {
    pub fn new(
        category: &str,
        priority: Priority,
        message: impl Into<String>,
        impact: &str,
    ) -> Self {
        Self {
            category: category.to_string(),
            priority,
            message: message.into(),
            impact: impact.to_string(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }
}

/// Where the statistics of a historical comparison came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonSource {
    /// Real records from the historical store
    Database,
    /// Simulated stand-in; not authoritative
    Synthetic,
}

/// Min/max yield seen across comparable records
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct YieldRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One comparable past record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparableRecord {
    pub id: String,
    pub actual_yield: Option<f64>,
    pub predicted_yield: Option<f64>,
    pub area: f64,
    pub planting_date: Option<NaiveDate>,
    pub accuracy: Option<i64>,
}

/// Summary of past observations sharing crop type, season and region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalComparison {
    pub average_yield: Option<f64>,
    pub record_count: u32,
    pub yield_range: YieldRange,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_crops: Vec<ComparableRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub source: ComparisonSource,
}

impl HistoricalComparison {
    /// Comparison for a store that answered but had nothing similar
    pub fn empty(message: &str) -> Self {
        Self {
            average_yield: None,
            record_count: 0,
            yield_range: YieldRange::default(),
            recent_crops: Vec::new(),
            message: Some(message.to_string()),
            source: ComparisonSource::Database,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == ComparisonSource::Synthetic
    }
}

/// Complete answer to a yield prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub predicted_yield: f64,
    pub unit: String,
    pub total_production: f64,
    /// Integer percentage, 30..=95
    pub confidence_score: u8,
    pub factor_scores: FactorScores,
    pub historical_comparison: HistoricalComparison,
    pub recommendations: Vec<Recommendation>,
    pub input_parameters: CropObservation,
    pub prediction_date: DateTime<Utc>,
    pub methodology: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
