//! HTTP request handlers for the Crop Yield Platform

pub mod crop;
pub mod health;
pub mod prediction;

pub use crop::*;
pub use health::*;
pub use prediction::*;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Success envelope: `{ "success": true, "data": .. }`
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

/// Wrap `data` in the success envelope with the given status
pub fn respond<T: Serialize>(status: StatusCode, data: T) -> axum::response::Response {
    (
        status,
        Json(ApiResponse {
            success: true,
            message: None,
            data,
        }),
    )
        .into_response()
}

/// Success envelope carrying a short confirmation message
pub fn respond_with_message<T: Serialize>(
    status: StatusCode,
    message: &'static str,
    data: T,
) -> axum::response::Response {
    (
        status,
        Json(ApiResponse {
            success: true,
            message: Some(message),
            data,
        }),
    )
        .into_response()
}
