//! Route definitions for the Crop Yield Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/predictions", prediction_routes())
        .nest("/crops", crop_routes())
}

/// Yield prediction routes
fn prediction_routes() -> Router<AppState> {
    Router::new()
        .route("/yield", post(handlers::predict_yield))
        .route("/analytics", get(handlers::get_yield_analytics))
}

/// Crop record routes
fn crop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_crops).post(handlers::create_crop))
        .route("/statistics", get(handlers::get_crop_statistics))
        .route(
            "/:crop_id",
            get(handlers::get_crop)
                .put(handlers::update_crop)
                .delete(handlers::delete_crop),
        )
}
