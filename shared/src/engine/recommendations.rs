//! Rule-based advisory generation
//!
//! Rules run in a fixed order and the list is truncated afterwards, so a
//! later rule can be dropped even when it fires. Entries are never re-sorted
//! by priority.

use crate::models::{CropObservation, FactorScores, HistoricalComparison, Priority, Recommendation};
use crate::validation::{is_optimal_ph, OPTIMAL_PH_MIN};

/// Default cap on advisories per prediction
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 6;

const STRESS_FACTOR: f64 = 0.8;
const LOW_INPUT_FACTOR: f64 = 0.9;
const LOW_RAINFALL_MM: f64 = 500.0;
const MONSOON_RAINFALL_MM: f64 = 800.0;
const HEAT_STRESS_C: f64 = 35.0;
const COLD_STRESS_C: f64 = 15.0;
const UNDERFED_TOTAL: f64 = 50.0;
const MIN_HISTORY_FOR_PERFORMANCE: u32 = 3;
const UNDERPERFORMANCE_RATIO: f64 = 0.8;

/// Generates prioritised advisories for a prediction
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    pub max_recommendations: usize,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self {
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
        }
    }
}

impl RecommendationEngine {
    pub fn new(max_recommendations: usize) -> Self {
        Self {
            max_recommendations,
        }
    }

    /// Evaluate every rule in order and keep the first `max_recommendations`
    pub fn generate(
        &self,
        observation: &CropObservation,
        scores: &FactorScores,
        history: &HistoricalComparison,
    ) -> Vec<Recommendation> {
        let rules: [Option<Recommendation>; 7] = [
            rainfall_rule(observation, scores),
            temperature_rule(observation, scores),
            fertilizer_rule(observation, scores),
            soil_rule(observation, scores),
            ph_rule(observation),
            performance_rule(scores, history),
            seasonal_rule(observation),
        ];

        rules
            .into_iter()
            .flatten()
            .take(self.max_recommendations)
            .collect()
    }
}

fn rainfall_rule(obs: &CropObservation, scores: &FactorScores) -> Option<Recommendation> {
    if scores.rainfall_factor >= STRESS_FACTOR {
        return None;
    }
    if obs.rainfall < LOW_RAINFALL_MM {
        Some(Recommendation::new(
            "Irrigation",
            Priority::High,
            "Consider supplemental irrigation due to low rainfall",
            "Could improve yield by 15-25%",
        ))
    } else {
        Some(Recommendation::new(
            "Water Management",
            Priority::Medium,
            "Monitor soil moisture levels regularly",
            "Prevents water stress",
        ))
    }
}

fn temperature_rule(obs: &CropObservation, scores: &FactorScores) -> Option<Recommendation> {
    if scores.temperature_factor >= STRESS_FACTOR {
        return None;
    }
    let avg = obs.temperature.average;
    if avg > HEAT_STRESS_C {
        Some(Recommendation::new(
            "Heat Management",
            Priority::High,
            "Consider shade nets or mulching to reduce heat stress",
            "Could prevent 10-20% yield loss",
        ))
    } else if avg < COLD_STRESS_C {
        Some(Recommendation::new(
            "Cold Protection",
            Priority::Medium,
            "Consider row covers or greenhouse cultivation",
            "Protects against cold damage",
        ))
    } else {
        None
    }
}

fn fertilizer_rule(obs: &CropObservation, scores: &FactorScores) -> Option<Recommendation> {
    if scores.fertilizer_factor < LOW_INPUT_FACTOR && obs.fertilizer.total() < UNDERFED_TOTAL {
        Some(
            Recommendation::new(
                "Fertilization",
                Priority::High,
                "Increase fertilizer application for better yield",
                "Could improve yield by 20-30%",
            )
            .with_suggestion("Consider balanced NPK fertilizer with organic supplements"),
        )
    } else {
        None
    }
}

fn soil_rule(obs: &CropObservation, scores: &FactorScores) -> Option<Recommendation> {
    (scores.soil_factor < LOW_INPUT_FACTOR).then(|| {
        Recommendation::new(
            "Soil Management",
            Priority::Medium,
            format!("{} soil may benefit from amendments", obs.soil_type),
            "Improves soil structure and nutrient availability",
        )
        .with_suggestion("Consider organic matter addition and soil testing")
    })
}

fn ph_rule(obs: &CropObservation) -> Option<Recommendation> {
    if is_optimal_ph(obs.ph) {
        return None;
    }
    let suggestion = if obs.ph < OPTIMAL_PH_MIN {
        "Consider lime application"
    } else {
        "Consider sulfur application"
    };
    Some(
        Recommendation::new(
            "Soil pH",
            Priority::Medium,
            format!("Soil pH ({}) is not optimal for {}", obs.ph, obs.crop_type),
            "pH adjustment can improve nutrient uptake",
        )
        .with_suggestion(suggestion),
    )
}

fn performance_rule(
    scores: &FactorScores,
    history: &HistoricalComparison,
) -> Option<Recommendation> {
    let average = history.average_yield.filter(|avg| *avg != 0.0)?;
    if history.record_count <= MIN_HISTORY_FOR_PERFORMANCE {
        return None;
    }
    (scores.predicted_yield() < average * UNDERPERFORMANCE_RATIO).then(|| {
        Recommendation::new(
            "Performance",
            Priority::High,
            "Predicted yield is below historical average for similar conditions",
            "Review all factors for optimization",
        )
        .with_suggestion("Consider consulting local agricultural extension services")
    })
}

fn seasonal_rule(obs: &CropObservation) -> Option<Recommendation> {
    (obs.season.is_high_rainfall() && obs.rainfall < MONSOON_RAINFALL_MM).then(|| {
        Recommendation::new(
            "Seasonal",
            Priority::Medium,
            format!("{} crops typically require higher rainfall", obs.season),
            &format!("Adequate water supply is crucial for {} season", obs.season),
        )
        .with_suggestion("Ensure irrigation backup is available")
    })
}
