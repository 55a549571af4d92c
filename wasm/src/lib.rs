//! WebAssembly module for the Crop Yield Platform
//!
//! Provides client-side computation for:
//! - Per-factor scores and yield estimates
//! - Confidence scoring
//! - Advisory generation without historical data
//! - Offline input validation

use validator::Validate;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::engine::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn parse_observation(observation_json: &str) -> Result<CropObservation, JsValue> {
    serde_json::from_str(observation_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid observation JSON: {}", e)))
}

/// Estimate yield (t/ha) for an observation given as JSON
#[wasm_bindgen]
pub fn estimate_yield(observation_json: &str) -> Result<f64, JsValue> {
    let observation = parse_observation(observation_json)?;
    Ok(predicted_yield(&observation))
}

/// Factor scores for an observation, returned as JSON
#[wasm_bindgen]
pub fn calculate_factor_scores(observation_json: &str) -> Result<String, JsValue> {
    let observation = parse_observation(observation_json)?;
    serde_json::to_string(&factor_scores(&observation))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Confidence percentage for an observation and a known history size
#[wasm_bindgen]
pub fn calculate_confidence(observation_json: &str, record_count: u32) -> Result<u8, JsValue> {
    let observation = parse_observation(observation_json)?;
    Ok(ConfidencePolicy::default().percent(&factor_scores(&observation), record_count))
}

/// Advisories for an observation when no history is available, as JSON
#[wasm_bindgen]
pub fn offline_recommendations(observation_json: &str) -> Result<String, JsValue> {
    let observation = parse_observation(observation_json)?;
    let scores = factor_scores(&observation);
    let history = HistoricalComparison::empty("Historical comparison requires a connection");
    let recommendations = RecommendationEngine::default().generate(&observation, &scores, &history);
    serde_json::to_string(&recommendations).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Validate an observation; returns a JSON array of messages (empty when valid)
#[wasm_bindgen]
pub fn validate_observation(observation_json: &str) -> Result<String, JsValue> {
    let observation = parse_observation(observation_json)?;
    let messages = match observation.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => validation_messages(&errors),
    };
    serde_json::to_string(&messages).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Total production in tons for a yield and an area
#[wasm_bindgen]
pub fn calculate_total_production(yield_t_per_ha: f64, area_ha: f64) -> f64 {
    if area_ha <= 0.0 {
        return 0.0;
    }
    round2(yield_t_per_ha * area_ha)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RICE: &str = r#"{
        "cropType": "Rice",
        "season": "Kharif",
        "area": 2.5,
        "rainfall": 1500,
        "temperature": { "average": 27, "min": 22, "max": 33 },
        "humidity": 80,
        "fertilizer": { "nitrogen": 80, "phosphorus": 40, "potassium": 30 },
        "soilType": "Alluvial",
        "pH": 6.5,
        "location": { "state": "Punjab", "district": "Ludhiana" }
    }"#;

    #[test]
    fn test_estimate_yield() {
        assert_eq!(estimate_yield(RICE).unwrap(), 6.48);
    }

    #[test]
    fn test_calculate_confidence() {
        assert_eq!(calculate_confidence(RICE, 0).unwrap(), 70);
        assert_eq!(calculate_confidence(RICE, 8).unwrap(), 90);
    }

    #[test]
    fn test_offline_recommendations_empty_for_optimal_rice() {
        assert_eq!(offline_recommendations(RICE).unwrap(), "[]");
    }

    #[test]
    fn test_total_production() {
        assert_eq!(calculate_total_production(6.48, 2.5), 16.2);
        assert_eq!(calculate_total_production(6.48, 0.0), 0.0);
    }
}
