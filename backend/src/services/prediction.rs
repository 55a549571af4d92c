//! Prediction orchestration
//!
//! Runs the factor model, historical comparison, advisories and confidence
//! scoring for one observation and assembles the response payload.

use chrono::Utc;
use shared::engine::{factor_scores, round2, ConfidencePolicy, RecommendationEngine};
use shared::models::{CropObservation, PredictionResult, METHODOLOGY, YIELD_UNIT};

use super::historical::HistoricalComparator;

/// Note attached to results whose comparison was simulated
pub const SYNTHETIC_NOTE: &str = "Historical comparison uses simulated data";

/// Yield prediction service
#[derive(Clone)]
pub struct PredictionService {
    comparator: HistoricalComparator,
    engine: RecommendationEngine,
    policy: ConfidencePolicy,
}

impl PredictionService {
    pub fn new(comparator: HistoricalComparator) -> Self {
        Self {
            comparator,
            engine: RecommendationEngine::default(),
            policy: ConfidencePolicy::default(),
        }
    }

    pub fn with_max_recommendations(mut self, max: usize) -> Self {
        self.engine = RecommendationEngine::new(max);
        self
    }

    pub fn with_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether comparisons are backed by a real historical source
    pub fn has_historical_source(&self) -> bool {
        self.comparator.has_source()
    }

    /// Predict yield for an observation that already passed validation
    pub async fn predict(&self, observation: &CropObservation) -> PredictionResult {
        let scores = factor_scores(observation);
        let predicted_yield = scores.predicted_yield();

        let historical_comparison = self.comparator.compare(observation).await;
        let recommendations = self
            .engine
            .generate(observation, &scores, &historical_comparison);
        let confidence_score = self
            .policy
            .percent(&scores, historical_comparison.record_count);

        tracing::info!(
            crop_type = %observation.crop_type,
            season = %observation.season,
            predicted_yield,
            confidence_score,
            history = historical_comparison.record_count,
            "Yield predicted"
        );

        let note = historical_comparison
            .is_synthetic()
            .then(|| SYNTHETIC_NOTE.to_string());

        PredictionResult {
            predicted_yield,
            unit: YIELD_UNIT.to_string(),
            total_production: round2(predicted_yield * observation.area),
            confidence_score,
            factor_scores: scores,
            historical_comparison,
            recommendations,
            input_parameters: observation.clone(),
            prediction_date: Utc::now(),
            methodology: METHODOLOGY.to_string(),
            note,
        }
    }
}
