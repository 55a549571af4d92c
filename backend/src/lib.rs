//! Crop Yield Platform - Backend Library
//!
//! Rule-based crop yield estimation served over HTTP, with crop-record
//! storage and historical comparison backed by PostgreSQL.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

use services::PredictionService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// `None` when the server runs without a database (synthetic history only)
    pub db: Option<sqlx::PgPool>,
    pub config: Arc<Config>,
    pub predictions: PredictionService,
}

impl AppState {
    /// Database pool, or `DatabaseUnavailable` in a synthetic-only deployment
    pub fn db(&self) -> AppResult<sqlx::PgPool> {
        self.db.clone().ok_or(AppError::DatabaseUnavailable)
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Crop Yield Prediction Platform API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
