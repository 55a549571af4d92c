//! Crop observation models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::types::GpsCoordinates;
use crate::validation::validate_crop_dates;

/// Error returned when a stored or submitted value is outside a closed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every member of the set, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical wire/storage label
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

closed_enum! {
    /// Supported crop types
    CropType, "crop type" {
        Rice => "Rice",
        Wheat => "Wheat",
        Corn => "Corn",
        Barley => "Barley",
        Soybeans => "Soybeans",
        Cotton => "Cotton",
        Sugarcane => "Sugarcane",
        Potato => "Potato",
        Tomato => "Tomato",
        Other => "Other",
    }
}

closed_enum! {
    /// Cropping seasons of the Indian agricultural calendar
    Season, "season" {
        Kharif => "Kharif",
        Rabi => "Rabi",
        Zaid => "Zaid",
        WholeYear => "Whole Year",
    }
}

closed_enum! {
    /// Soil classifications
    SoilType, "soil type" {
        Alluvial => "Alluvial",
        Clay => "Clay",
        Sandy => "Sandy",
        Loamy => "Loamy",
        Red => "Red",
        Black => "Black",
        Laterite => "Laterite",
        Desert => "Desert",
    }
}

impl Season {
    /// Whether this is the monsoon-fed, high-rainfall season of the calendar
    pub fn is_high_rainfall(&self) -> bool {
        matches!(self, Season::Kharif)
    }
}

/// Temperature readings over the growing period (°C)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Validate)]
pub struct Temperature {
    #[validate(range(min = -20.0, max = 60.0, message = "Average temperature must be between -20 and 60"))]
    pub average: f64,
    #[validate(range(min = -30.0, max = 50.0, message = "Minimum temperature must be between -30 and 50"))]
    pub min: f64,
    #[validate(range(min = -10.0, max = 70.0, message = "Maximum temperature must be between -10 and 70"))]
    pub max: f64,
}

/// Largest accepted dose of a single nutrient, in kg per hectare
pub const MAX_FERTILIZER_KG_PER_HA: f64 = 10000.0;

/// Fertilizer applied, in kg per hectare
///
/// Each nutrient is capped at [`MAX_FERTILIZER_KG_PER_HA`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct Fertilizer {
    #[validate(range(min = 0.0, max = 10000.0, message = "Nitrogen must be between 0 and 10000 kg/ha"))]
    pub nitrogen: f64,
    #[validate(range(min = 0.0, max = 10000.0, message = "Phosphorus must be between 0 and 10000 kg/ha"))]
    pub phosphorus: f64,
    #[validate(range(min = 0.0, max = 10000.0, message = "Potassium must be between 0 and 10000 kg/ha"))]
    pub potassium: f64,
    #[validate(range(min = 0.0, max = 10000.0, message = "Organic fertilizer must be between 0 and 10000 kg/ha"))]
    pub organic: f64,
}

impl Fertilizer {
    /// Total load across all nutrient sources
    pub fn total(&self) -> f64 {
        self.nitrogen + self.phosphorus + self.potassium + self.organic
    }
}

/// Administrative location of a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct Location {
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "District is required"))]
    pub district: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate]
    pub coordinates: Option<GpsCoordinates>,
}

/// A set of agronomic observations for one field and season
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_crop_dates", skip_on_field_errors = false))]
pub struct CropObservation {
    pub crop_type: CropType,
    pub season: Season,
    /// Cultivated area in hectares
    #[validate(range(min = 0.1, max = 10000.0, message = "Area must be between 0.1 and 10000 hectares"))]
    pub area: f64,
    /// Seasonal rainfall in mm
    #[validate(range(min = 0.0, max = 5000.0, message = "Rainfall must be between 0 and 5000 mm"))]
    pub rainfall: f64,
    #[validate]
    pub temperature: Temperature,
    #[validate(range(min = 0.0, max = 100.0, message = "Humidity must be between 0 and 100%"))]
    pub humidity: f64,
    #[serde(default)]
    #[validate]
    pub fertilizer: Fertilizer,
    pub soil_type: SoilType,
    #[serde(rename = "pH")]
    #[validate(range(min = 0.0, max = 14.0, message = "pH must be between 0 and 14"))]
    pub ph: f64,
    #[validate]
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planting_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvest_date: Option<NaiveDate>,
    /// Measured yield in tons per hectare, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Actual yield must be non-negative"))]
    pub actual_yield: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
}

impl CropObservation {
    /// Whole days between planting and harvest
    pub fn growing_period_days(&self) -> Option<i64> {
        match (self.planting_date, self.harvest_date) {
            (Some(planted), Some(harvested)) => Some((harvested - planted).num_days()),
            _ => None,
        }
    }
}

/// A stored crop record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub observation: CropObservation,
    pub predicted_yield: Option<f64>,
    pub growing_period: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
