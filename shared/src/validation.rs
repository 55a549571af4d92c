//! Validation utilities for the Crop Yield Platform
//!
//! Field-level bounds live on the model types as `validator` attributes;
//! this module holds the cross-field rules and helpers for turning
//! `ValidationErrors` into messages a client can display.

use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::models::CropObservation;

// ============================================================================
// Cross-field Rules
// ============================================================================

/// Harvest date, when present, must be strictly after the planting date
pub fn validate_crop_dates(observation: &CropObservation) -> Result<(), ValidationError> {
    match (observation.planting_date, observation.harvest_date) {
        (Some(planted), Some(harvested)) if harvested <= planted => {
            let mut error = ValidationError::new("harvest_before_planting");
            error.message = Some(Cow::Borrowed("Harvest date must be after planting date"));
            Err(error)
        }
        (None, Some(_)) => {
            let mut error = ValidationError::new("harvest_without_planting");
            error.message = Some(Cow::Borrowed(
                "Harvest date requires a planting date",
            ));
            Err(error)
        }
        _ => Ok(()),
    }
}

// ============================================================================
// Error Flattening
// ============================================================================

/// Flatten nested validation errors into `path: message` strings
///
/// Output is sorted so responses are stable across runs.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect_messages(errors, "", &mut messages);
    messages.sort();
    messages
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if *field == "__all__" {
            prefix.to_string()
        } else if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    if path.is_empty() {
                        out.push(message);
                    } else {
                        out.push(format!("{}: {}", path, message));
                    }
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

/// Lower edge of the soil pH band most field crops tolerate
pub const OPTIMAL_PH_MIN: f64 = 6.0;
/// Upper edge of the soil pH band most field crops tolerate
pub const OPTIMAL_PH_MAX: f64 = 8.0;

/// Whether a soil pH is in the band most field crops tolerate
pub fn is_optimal_ph(ph: f64) -> bool {
    (OPTIMAL_PH_MIN..=OPTIMAL_PH_MAX).contains(&ph)
}
