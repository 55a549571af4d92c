//! Yield prediction HTTP handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::models::CropObservation;
use validator::Validate;

use super::respond;
use crate::error::AppError;
use crate::services::analytics::{AnalyticsFilter, AnalyticsService};
use crate::AppState;

/// Predict yield for a set of observations
pub async fn predict_yield(
    State(state): State<AppState>,
    payload: Result<Json<CropObservation>, JsonRejection>,
) -> impl IntoResponse {
    let observation = match payload {
        Ok(Json(observation)) => observation,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };
    if let Err(errors) = observation.validate() {
        return AppError::from(errors).into_response();
    }

    let result = state.predictions.predict(&observation).await;
    respond(StatusCode::OK, result)
}

/// Yield trends and analytics over stored records
pub async fn get_yield_analytics(
    State(state): State<AppState>,
    query: Result<Query<AnalyticsFilter>, QueryRejection>,
) -> impl IntoResponse {
    let filter = match query {
        Ok(Query(filter)) => filter,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };
    let db = match state.db() {
        Ok(db) => db,
        Err(e) => return e.into_response(),
    };
    let service = AnalyticsService::new(db);

    match service.yield_analytics(filter).await {
        Ok(analytics) => respond(StatusCode::OK, analytics),
        Err(e) => e.into_response(),
    }
}
