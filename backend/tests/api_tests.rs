//! HTTP surface tests against a database-less deployment
//!
//! Covers:
//! - Prediction envelope and synthetic-history tagging
//! - Validation error responses, including malformed bodies, queries and paths
//! - Database-only endpoints answering 503 without a database

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use crop_yield_backend::{
    config::{Config, DatabaseConfig, PredictionConfig, ServerConfig},
    create_app,
    services::{HistoricalComparator, PredictionService, SyntheticHistory},
    AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Router {
    let config = Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://localhost/crop_yield_test".to_string(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_secs: 1,
        },
        prediction: PredictionConfig::default(),
    };

    create_app(AppState {
        db: None,
        config: Arc::new(config),
        predictions: PredictionService::new(HistoricalComparator::new(SyntheticHistory::seeded(5))),
    })
}

fn rice_payload() -> Value {
    json!({
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
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_root_health() {
    let response = test_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_api_health_reports_synthetic_mode() {
    let (status, body) = send(test_app(), get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "not configured");
    assert_eq!(body["historicalSource"], "synthetic");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn test_predict_yield_envelope() {
    let (status, body) = send(test_app(), post_json("/api/v1/predictions/yield", &rice_payload())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["predictedYield"], 6.48);
    assert_eq!(data["totalProduction"], 16.2);
    assert_eq!(data["unit"], "tons per hectare");
    assert_eq!(data["factorScores"]["soilFactor"], 1.2);
    assert_eq!(data["historicalComparison"]["source"], "synthetic");
    assert_eq!(data["note"], "Historical comparison uses simulated data");
    assert_eq!(data["inputParameters"]["pH"], 6.5);
    assert_eq!(data["recommendations"], json!([]));
    assert!(data["predictionDate"].is_string());
}

#[tokio::test]
async fn test_predict_yield_rejects_out_of_range_input() {
    let mut payload = rice_payload();
    payload["area"] = json!(0.0);
    payload["humidity"] = json!(140);

    let (status, body) = send(test_app(), post_json("/api/v1/predictions/yield", &payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["error"]["details"],
        json!([
            "area: Area must be between 0.1 and 10000 hectares",
            "humidity: Humidity must be between 0 and 100%"
        ])
    );
}

#[tokio::test]
async fn test_predict_yield_rejects_harvest_before_planting() {
    let mut payload = rice_payload();
    payload["plantingDate"] = json!("2024-07-01");
    payload["harvestDate"] = json!("2024-06-01");

    let (status, body) = send(test_app(), post_json("/api/v1/predictions/yield", &payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["details"],
        json!(["Harvest date must be after planting date"])
    );
}

#[tokio::test]
async fn test_predict_yield_rejects_unknown_crop_type() {
    let mut payload = rice_payload();
    payload["cropType"] = json!("Banana");

    let (status, body) = send(test_app(), post_json("/api/v1/predictions/yield", &payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "body");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("unknown variant `Banana`"));
}

#[tokio::test]
async fn test_predict_yield_rejects_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/predictions/yield")
        .header("content-type", "application/json")
        .body(Body::from("{\"cropType\": "))
        .unwrap();

    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_bad_query_and_path_use_error_envelope() {
    let (status, body) = send(test_app(), get("/api/v1/crops?cropType=Banana")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "query");

    let (status, body) = send(test_app(), get("/api/v1/predictions/analytics?year=soon")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(test_app(), get("/api/v1/crops/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["field"], "path");
}

#[tokio::test]
async fn test_crop_endpoints_need_a_database() {
    let (status, body) = send(test_app(), get("/api/v1/crops")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "DATABASE_UNAVAILABLE");

    let (status, _) = send(test_app(), get("/api/v1/crops/statistics")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(test_app(), get("/api/v1/predictions/analytics?year=2024")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
