//! Factor model: per-dimension yield multipliers and base yields

use crate::models::{CropObservation, CropType, FactorScores, Fertilizer, SoilType};

use super::round2;

/// Base yield (t/ha) used for crops without a tabulated value
pub const DEFAULT_BASE_YIELD: f64 = 3.0;

const RAINFALL_DEFICIT_FLOOR: f64 = 0.3;
const RAINFALL_EXCESS_FLOOR: f64 = 0.4;
const TEMPERATURE_FLOOR: f64 = 0.4;

/// Fertilizer load (kg/ha) below which the crop is under-fed
pub const FERTILIZER_OPTIMAL_MIN: f64 = 50.0;
/// Fertilizer load (kg/ha) above which returns diminish
pub const FERTILIZER_OPTIMAL_MAX: f64 = 200.0;

/// Inclusive range of a growing condition with no yield penalty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimalWindow {
    pub min: f64,
    pub max: f64,
}

impl OptimalWindow {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Linear falloff outside the window, floored separately on each side
    fn falloff(&self, value: f64, below_floor: f64, above_floor: f64) -> f64 {
        if self.contains(value) {
            1.0
        } else if value < self.min {
            (value / self.min).max(below_floor)
        } else {
            (self.max / value).max(above_floor)
        }
    }
}

/// Typical yield in tons per hectare under neutral conditions
pub fn base_yield(crop: CropType) -> f64 {
    match crop {
        CropType::Rice => 4.5,
        CropType::Wheat => 3.2,
        CropType::Corn => 5.8,
        CropType::Barley => 2.8,
        CropType::Soybeans => 2.5,
        CropType::Cotton => 1.8,
        CropType::Sugarcane => 70.0,
        CropType::Potato => 25.0,
        CropType::Tomato => 40.0,
        CropType::Other => DEFAULT_BASE_YIELD,
    }
}

/// Seasonal rainfall (mm) at which a crop suffers no water stress
pub fn optimal_rainfall(crop: CropType) -> OptimalWindow {
    match crop {
        CropType::Rice => OptimalWindow::new(1200.0, 1800.0),
        CropType::Wheat => OptimalWindow::new(400.0, 600.0),
        CropType::Corn => OptimalWindow::new(600.0, 1000.0),
        CropType::Barley => OptimalWindow::new(300.0, 500.0),
        CropType::Soybeans => OptimalWindow::new(500.0, 800.0),
        CropType::Cotton => OptimalWindow::new(600.0, 1200.0),
        CropType::Sugarcane => OptimalWindow::new(1200.0, 1500.0),
        CropType::Potato => OptimalWindow::new(400.0, 600.0),
        CropType::Tomato => OptimalWindow::new(400.0, 700.0),
        CropType::Other => OptimalWindow::new(500.0, 800.0),
    }
}

/// Average growing temperature (°C) at which a crop suffers no stress
pub fn optimal_temperature(crop: CropType) -> OptimalWindow {
    match crop {
        CropType::Rice => OptimalWindow::new(20.0, 35.0),
        CropType::Wheat => OptimalWindow::new(15.0, 25.0),
        CropType::Corn => OptimalWindow::new(18.0, 30.0),
        CropType::Barley => OptimalWindow::new(10.0, 20.0),
        CropType::Soybeans => OptimalWindow::new(20.0, 30.0),
        CropType::Cotton => OptimalWindow::new(25.0, 35.0),
        CropType::Sugarcane => OptimalWindow::new(25.0, 35.0),
        CropType::Potato => OptimalWindow::new(15.0, 25.0),
        CropType::Tomato => OptimalWindow::new(18.0, 28.0),
        CropType::Other => OptimalWindow::new(18.0, 28.0),
    }
}

/// Rainfall multiplier in [0.3, 1.0]
///
/// Deficit falls off to a floor of 0.3, excess to a floor of 0.4.
pub fn rainfall_factor(crop: CropType, rainfall: f64) -> f64 {
    optimal_rainfall(crop).falloff(rainfall, RAINFALL_DEFICIT_FLOOR, RAINFALL_EXCESS_FLOOR)
}

/// Temperature multiplier in [0.4, 1.0]
pub fn temperature_factor(crop: CropType, average_temp: f64) -> f64 {
    optimal_temperature(crop).falloff(average_temp, TEMPERATURE_FLOOR, TEMPERATURE_FLOOR)
}

/// Fertilizer multiplier in [0.7, 1.3]
///
/// Ramps 0.7 → 1.0 up to 50 kg/ha, gains up to 1.3 at 200 kg/ha, then decays
/// towards 0.8 for over-application.
pub fn fertilizer_factor(fertilizer: &Fertilizer) -> f64 {
    let total = fertilizer.total();
    if (FERTILIZER_OPTIMAL_MIN..=FERTILIZER_OPTIMAL_MAX).contains(&total) {
        1.0 + (total - FERTILIZER_OPTIMAL_MIN) * 0.002
    } else if total < FERTILIZER_OPTIMAL_MIN {
        0.7 + (total / FERTILIZER_OPTIMAL_MIN) * 0.3
    } else {
        (1.3 - (total - FERTILIZER_OPTIMAL_MAX) * 0.001).max(0.8)
    }
}

/// Fixed soil multiplier
pub fn soil_factor(soil: SoilType) -> f64 {
    match soil {
        SoilType::Alluvial => 1.2,
        SoilType::Clay => 0.9,
        SoilType::Sandy => 0.8,
        SoilType::Loamy => 1.1,
        SoilType::Red => 0.9,
        SoilType::Black => 1.0,
        SoilType::Laterite => 0.7,
        SoilType::Desert => 0.5,
    }
}

/// Evaluate every factor for an observation
pub fn factor_scores(observation: &CropObservation) -> FactorScores {
    FactorScores {
        base_yield: base_yield(observation.crop_type),
        rainfall_factor: rainfall_factor(observation.crop_type, observation.rainfall),
        temperature_factor: temperature_factor(
            observation.crop_type,
            observation.temperature.average,
        ),
        fertilizer_factor: fertilizer_factor(&observation.fertilizer),
        soil_factor: soil_factor(observation.soil_type),
    }
}

impl FactorScores {
    /// The four environmental multipliers, in a fixed order
    pub fn factors(&self) -> [f64; 4] {
        [
            self.rainfall_factor,
            self.temperature_factor,
            self.fertilizer_factor,
            self.soil_factor,
        ]
    }

    /// Mean of the four environmental multipliers
    pub fn average_factor(&self) -> f64 {
        self.factors().iter().sum::<f64>() / 4.0
    }

    /// Point estimate in tons per hectare, rounded to 2 decimals
    pub fn predicted_yield(&self) -> f64 {
        round2(
            self.base_yield
                * self.rainfall_factor
                * self.temperature_factor
                * self.fertilizer_factor
                * self.soil_factor,
        )
    }
}

/// Point estimate in tons per hectare for an observation
pub fn predicted_yield(observation: &CropObservation) -> f64 {
    factor_scores(observation).predicted_yield()
}
