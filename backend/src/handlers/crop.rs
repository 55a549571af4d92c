//! Crop record HTTP handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::models::CropObservation;
use uuid::Uuid;

use super::{respond, respond_with_message};
use crate::error::AppError;
use crate::services::crop::{CropFilter, CropService, ListCropsQuery};
use crate::AppState;

fn rejected(rejection: impl Into<AppError>) -> axum::response::Response {
    rejection.into().into_response()
}

fn crop_service(state: &AppState) -> Result<CropService, axum::response::Response> {
    state
        .db()
        .map(CropService::new)
        .map_err(|e| e.into_response())
}

/// List crop records with filtering and pagination
pub async fn list_crops(
    State(state): State<AppState>,
    query: Result<Query<ListCropsQuery>, QueryRejection>,
) -> impl IntoResponse {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejected(rejection),
    };
    let service = match crop_service(&state) {
        Ok(service) => service,
        Err(response) => return response,
    };

    match service.list(query).await {
        Ok(page) => respond(StatusCode::OK, page),
        Err(e) => e.into_response(),
    }
}

/// Get a specific crop record
pub async fn get_crop(
    State(state): State<AppState>,
    crop_id: Result<Path<Uuid>, PathRejection>,
) -> impl IntoResponse {
    let Path(crop_id) = match crop_id {
        Ok(crop_id) => crop_id,
        Err(rejection) => return rejected(rejection),
    };
    let service = match crop_service(&state) {
        Ok(service) => service,
        Err(response) => return response,
    };

    match service.get(crop_id).await {
        Ok(crop) => respond(StatusCode::OK, crop),
        Err(e) => e.into_response(),
    }
}

/// Record a new crop
pub async fn create_crop(
    State(state): State<AppState>,
    payload: Result<Json<CropObservation>, JsonRejection>,
) -> impl IntoResponse {
    let Json(observation) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };
    let service = match crop_service(&state) {
        Ok(service) => service,
        Err(response) => return response,
    };

    match service.create(observation).await {
        Ok(crop) => respond_with_message(StatusCode::CREATED, "Crop created successfully", crop),
        Err(e) => e.into_response(),
    }
}

/// Update a crop record
pub async fn update_crop(
    State(state): State<AppState>,
    crop_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CropObservation>, JsonRejection>,
) -> impl IntoResponse {
    let Path(crop_id) = match crop_id {
        Ok(crop_id) => crop_id,
        Err(rejection) => return rejected(rejection),
    };
    let Json(observation) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };
    let service = match crop_service(&state) {
        Ok(service) => service,
        Err(response) => return response,
    };

    match service.update(crop_id, observation).await {
        Ok(crop) => respond_with_message(StatusCode::OK, "Crop updated successfully", crop),
        Err(e) => e.into_response(),
    }
}

/// Delete a crop record
pub async fn delete_crop(
    State(state): State<AppState>,
    crop_id: Result<Path<Uuid>, PathRejection>,
) -> impl IntoResponse {
    let Path(crop_id) = match crop_id {
        Ok(crop_id) => crop_id,
        Err(rejection) => return rejected(rejection),
    };
    let service = match crop_service(&state) {
        Ok(service) => service,
        Err(response) => return response,
    };

    match service.delete(crop_id).await {
        Ok(()) => respond_with_message(StatusCode::OK, "Crop deleted successfully", ()),
        Err(e) => e.into_response(),
    }
}

/// Aggregate statistics over crop records
pub async fn get_crop_statistics(
    State(state): State<AppState>,
    filter: Result<Query<CropFilter>, QueryRejection>,
) -> impl IntoResponse {
    let Query(filter) = match filter {
        Ok(filter) => filter,
        Err(rejection) => return rejected(rejection),
    };
    let service = match crop_service(&state) {
        Ok(service) => service,
        Err(response) => return response,
    };

    match service.statistics(filter).await {
        Ok(statistics) => respond(StatusCode::OK, statistics),
        Err(e) => e.into_response(),
    }
}
