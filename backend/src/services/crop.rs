//! Crop record service for storing and querying observations

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::engine::predicted_yield;
use shared::models::{
    CropObservation, CropRecord, CropType, Fertilizer, Location, Season, Temperature,
};
use shared::types::{GpsCoordinates, Pagination, PaginationMeta};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Crop record service
#[derive(Clone)]
pub struct CropService {
    db: PgPool,
}

/// Database row for a crop record
#[derive(Debug, Clone, sqlx::FromRow)]
struct CropRow {
    id: Uuid,
    crop_type: String,
    season: String,
    area: Decimal,
    rainfall: Decimal,
    temperature_average: Decimal,
    temperature_min: Decimal,
    temperature_max: Decimal,
    humidity: Decimal,
    fertilizer_nitrogen: Decimal,
    fertilizer_phosphorus: Decimal,
    fertilizer_potassium: Decimal,
    fertilizer_organic: Decimal,
    soil_type: String,
    ph: Decimal,
    state: String,
    district: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    planting_date: Option<NaiveDate>,
    harvest_date: Option<NaiveDate>,
    actual_yield: Option<Decimal>,
    predicted_yield: Option<Decimal>,
    growing_period: Option<i32>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default()
}

impl TryFrom<CropRow> for CropRecord {
    type Error = AppError;

    fn try_from(row: CropRow) -> Result<Self, Self::Error> {
        let invalid = |e: shared::models::UnknownVariant| {
            AppError::Internal(format!("Stored crop {} is corrupt: {}", row.id, e))
        };

        let coordinates = match (row.latitude, row.longitude) {
            (Some(lat), Some(lng)) => Some(GpsCoordinates::new(lat, lng)),
            _ => None,
        };

        let observation = CropObservation {
            crop_type: row.crop_type.parse().map_err(invalid)?,
            season: row.season.parse().map_err(invalid)?,
            area: to_f64(row.area),
            rainfall: to_f64(row.rainfall),
            temperature: Temperature {
                average: to_f64(row.temperature_average),
                min: to_f64(row.temperature_min),
                max: to_f64(row.temperature_max),
            },
            humidity: to_f64(row.humidity),
            fertilizer: Fertilizer {
                nitrogen: to_f64(row.fertilizer_nitrogen),
                phosphorus: to_f64(row.fertilizer_phosphorus),
                potassium: to_f64(row.fertilizer_potassium),
                organic: to_f64(row.fertilizer_organic),
            },
            soil_type: row.soil_type.parse().map_err(invalid)?,
            ph: to_f64(row.ph),
            location: Location {
                state: row.state.clone(),
                district: row.district.clone(),
                coordinates,
            },
            planting_date: row.planting_date,
            harvest_date: row.harvest_date,
            actual_yield: row.actual_yield.map(to_f64),
            notes: row.notes.clone(),
        };

        Ok(CropRecord {
            id: row.id,
            observation,
            predicted_yield: row.predicted_yield.map(to_f64),
            growing_period: row.growing_period.map(i64::from),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Filters shared by listing and statistics
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropFilter {
    pub crop_type: Option<CropType>,
    pub season: Option<Season>,
    /// Case-insensitive substring of the state name
    pub state: Option<String>,
    /// Case-insensitive substring of the district name
    pub district: Option<String>,
}

/// Sortable crop columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CropSortField {
    #[default]
    CreatedAt,
    PlantingDate,
    PredictedYield,
    ActualYield,
    Area,
    Rainfall,
}

impl CropSortField {
    fn column(&self) -> &'static str {
        match self {
            CropSortField::CreatedAt => "created_at",
            CropSortField::PlantingDate => "planting_date",
            CropSortField::PredictedYield => "predicted_yield",
            CropSortField::ActualYield => "actual_yield",
            CropSortField::Area => "area",
            CropSortField::Rainfall => "rainfall",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query parameters for listing crop records
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCropsQuery {
    pub crop_type: Option<CropType>,
    pub season: Option<Season>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub sort_by: CropSortField,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl ListCropsQuery {
    pub fn filter(&self) -> CropFilter {
        CropFilter {
            crop_type: self.crop_type,
            season: self.season,
            state: self.state.clone(),
            district: self.district.clone(),
        }
    }
}

/// A page of crop records
#[derive(Debug, Clone, Serialize)]
pub struct CropPage {
    pub crops: Vec<CropRecord>,
    pub pagination: PaginationMeta,
}

/// Aggregate figures across matching records
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OverallStatistics {
    pub total_crops: i64,
    pub total_area: f64,
    pub avg_predicted_yield: f64,
    pub avg_actual_yield: f64,
    pub avg_rainfall: f64,
    pub avg_temperature: f64,
    pub max_yield: f64,
    pub min_yield: f64,
}

/// Counts and yields per crop type
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CropDistribution {
    pub crop_type: String,
    pub count: i64,
    pub total_area: f64,
    pub avg_yield: Option<f64>,
}

/// Counts and yields per season
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalDistribution {
    pub season: String,
    pub count: i64,
    pub avg_yield: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropStatistics {
    pub overall: OverallStatistics,
    pub crop_distribution: Vec<CropDistribution>,
    pub seasonal_distribution: Vec<SeasonalDistribution>,
}

const CROP_COLUMNS: &str = r#"
    id, crop_type, season, area, rainfall,
    temperature_average, temperature_min, temperature_max, humidity,
    fertilizer_nitrogen, fertilizer_phosphorus, fertilizer_potassium, fertilizer_organic,
    soil_type, ph, state, district, latitude, longitude,
    planting_date, harvest_date, actual_yield, predicted_yield, growing_period, notes,
    created_at, updated_at
"#;

const FILTER_CLAUSE: &str = r#"
    ($1::text IS NULL OR crop_type = $1)
    AND ($2::text IS NULL OR season = $2)
    AND ($3::text IS NULL OR state ILIKE '%' || $3 || '%')
    AND ($4::text IS NULL OR district ILIKE '%' || $4 || '%')
"#;

/// Reject stored-record input that the prediction endpoint would accept
pub fn validate_for_storage(observation: &CropObservation) -> AppResult<()> {
    observation.validate()?;
    if observation.planting_date.is_none() {
        return Err(AppError::Validation {
            field: "plantingDate".to_string(),
            message: "Planting date is required".to_string(),
        });
    }
    Ok(())
}

impl CropService {
    /// Create a new CropService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List crop records with filters, sorting and pagination
    pub async fn list(&self, query: ListCropsQuery) -> AppResult<CropPage> {
        let pagination = Pagination::from_query(query.page, query.limit);
        let filter = query.filter();

        let sql = format!(
            "SELECT {} FROM crops WHERE {} ORDER BY {} {} NULLS LAST, id LIMIT $5 OFFSET $6",
            CROP_COLUMNS,
            FILTER_CLAUSE,
            query.sort_by.column(),
            query.sort_order.keyword(),
        );

        let rows = sqlx::query_as::<_, CropRow>(&sql)
            .bind(filter.crop_type.map(|c| c.as_str()))
            .bind(filter.season.map(|s| s.as_str()))
            .bind(filter.state.as_deref())
            .bind(filter.district.as_deref())
            .bind(i64::from(pagination.limit))
            .bind(pagination.offset() as i64)
            .fetch_all(&self.db)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM crops WHERE {}",
            FILTER_CLAUSE
        ))
        .bind(filter.crop_type.map(|c| c.as_str()))
        .bind(filter.season.map(|s| s.as_str()))
        .bind(filter.state.as_deref())
        .bind(filter.district.as_deref())
        .fetch_one(&self.db)
        .await?;

        let crops = rows
            .into_iter()
            .map(CropRecord::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        let pagination = pagination.meta(crops.len(), total.max(0) as u64);

        Ok(CropPage { crops, pagination })
    }

    /// Get a crop record by ID
    pub async fn get(&self, id: Uuid) -> AppResult<CropRecord> {
        let row = sqlx::query_as::<_, CropRow>(&format!(
            "SELECT {} FROM crops WHERE id = $1",
            CROP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Crop".to_string()))?;

        row.try_into()
    }

    /// Store a new crop record with its estimated yield
    pub async fn create(&self, observation: CropObservation) -> AppResult<CropRecord> {
        validate_for_storage(&observation)?;

        let id = Uuid::new_v4();
        let estimate = predicted_yield(&observation);
        let growing_period = observation.growing_period_days().map(|d| d as i32);
        let coordinates = observation.location.coordinates;

        let row = sqlx::query_as::<_, CropRow>(&format!(
            r#"
            INSERT INTO crops (
                id, crop_type, season, area, rainfall,
                temperature_average, temperature_min, temperature_max, humidity,
                fertilizer_nitrogen, fertilizer_phosphorus, fertilizer_potassium, fertilizer_organic,
                soil_type, ph, state, district, latitude, longitude,
                planting_date, harvest_date, actual_yield, predicted_yield, growing_period, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
            RETURNING {}
            "#,
            CROP_COLUMNS
        ))
        .bind(id)
        .bind(observation.crop_type.as_str())
        .bind(observation.season.as_str())
        .bind(to_decimal(observation.area))
        .bind(to_decimal(observation.rainfall))
        .bind(to_decimal(observation.temperature.average))
        .bind(to_decimal(observation.temperature.min))
        .bind(to_decimal(observation.temperature.max))
        .bind(to_decimal(observation.humidity))
        .bind(to_decimal(observation.fertilizer.nitrogen))
        .bind(to_decimal(observation.fertilizer.phosphorus))
        .bind(to_decimal(observation.fertilizer.potassium))
        .bind(to_decimal(observation.fertilizer.organic))
        .bind(observation.soil_type.as_str())
        .bind(to_decimal(observation.ph))
        .bind(&observation.location.state)
        .bind(&observation.location.district)
        .bind(coordinates.map(|c| c.latitude))
        .bind(coordinates.map(|c| c.longitude))
        .bind(observation.planting_date)
        .bind(observation.harvest_date)
        .bind(observation.actual_yield.map(to_decimal))
        .bind(to_decimal(estimate))
        .bind(growing_period)
        .bind(&observation.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(crop_id = %id, predicted_yield = estimate, "Crop record created");

        row.try_into()
    }

    /// Replace a crop record and recompute its estimated yield
    pub async fn update(&self, id: Uuid, observation: CropObservation) -> AppResult<CropRecord> {
        validate_for_storage(&observation)?;

        let estimate = predicted_yield(&observation);
        let growing_period = observation.growing_period_days().map(|d| d as i32);
        let coordinates = observation.location.coordinates;

        let row = sqlx::query_as::<_, CropRow>(&format!(
            r#"
            UPDATE crops SET
                crop_type = $2, season = $3, area = $4, rainfall = $5,
                temperature_average = $6, temperature_min = $7, temperature_max = $8,
                humidity = $9,
                fertilizer_nitrogen = $10, fertilizer_phosphorus = $11,
                fertilizer_potassium = $12, fertilizer_organic = $13,
                soil_type = $14, ph = $15, state = $16, district = $17,
                latitude = $18, longitude = $19,
                planting_date = $20, harvest_date = $21, actual_yield = $22,
                predicted_yield = $23, growing_period = $24, notes = $25,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CROP_COLUMNS
        ))
        .bind(id)
        .bind(observation.crop_type.as_str())
        .bind(observation.season.as_str())
        .bind(to_decimal(observation.area))
        .bind(to_decimal(observation.rainfall))
        .bind(to_decimal(observation.temperature.average))
        .bind(to_decimal(observation.temperature.min))
        .bind(to_decimal(observation.temperature.max))
        .bind(to_decimal(observation.humidity))
        .bind(to_decimal(observation.fertilizer.nitrogen))
        .bind(to_decimal(observation.fertilizer.phosphorus))
        .bind(to_decimal(observation.fertilizer.potassium))
        .bind(to_decimal(observation.fertilizer.organic))
        .bind(observation.soil_type.as_str())
        .bind(to_decimal(observation.ph))
        .bind(&observation.location.state)
        .bind(&observation.location.district)
        .bind(coordinates.map(|c| c.latitude))
        .bind(coordinates.map(|c| c.longitude))
        .bind(observation.planting_date)
        .bind(observation.harvest_date)
        .bind(observation.actual_yield.map(to_decimal))
        .bind(to_decimal(estimate))
        .bind(growing_period)
        .bind(&observation.notes)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Crop".to_string()))?;

        tracing::info!(crop_id = %id, predicted_yield = estimate, "Crop record updated");

        row.try_into()
    }

    /// Delete a crop record
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM crops WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Crop".to_string()));
        }

        Ok(())
    }

    /// Aggregate statistics and distributions over matching records
    pub async fn statistics(&self, filter: CropFilter) -> AppResult<CropStatistics> {
        let overall = sqlx::query_as::<_, OverallStatistics>(&format!(
            r#"
            SELECT COUNT(*) AS total_crops,
                   COALESCE(SUM(area), 0)::float8 AS total_area,
                   COALESCE(AVG(predicted_yield), 0)::float8 AS avg_predicted_yield,
                   COALESCE(AVG(actual_yield), 0)::float8 AS avg_actual_yield,
                   COALESCE(AVG(rainfall), 0)::float8 AS avg_rainfall,
                   COALESCE(AVG(temperature_average), 0)::float8 AS avg_temperature,
                   COALESCE(MAX(predicted_yield), 0)::float8 AS max_yield,
                   COALESCE(MIN(predicted_yield), 0)::float8 AS min_yield
            FROM crops
            WHERE {}
            "#,
            FILTER_CLAUSE
        ))
        .bind(filter.crop_type.map(|c| c.as_str()))
        .bind(filter.season.map(|s| s.as_str()))
        .bind(filter.state.as_deref())
        .bind(filter.district.as_deref())
        .fetch_one(&self.db)
        .await?;

        let crop_distribution = sqlx::query_as::<_, CropDistribution>(&format!(
            r#"
            SELECT crop_type,
                   COUNT(*) AS count,
                   COALESCE(SUM(area), 0)::float8 AS total_area,
                   AVG(predicted_yield)::float8 AS avg_yield
            FROM crops
            WHERE {}
            GROUP BY crop_type
            ORDER BY count DESC, crop_type
            "#,
            FILTER_CLAUSE
        ))
        .bind(filter.crop_type.map(|c| c.as_str()))
        .bind(filter.season.map(|s| s.as_str()))
        .bind(filter.state.as_deref())
        .bind(filter.district.as_deref())
        .fetch_all(&self.db)
        .await?;

        let seasonal_distribution = sqlx::query_as::<_, SeasonalDistribution>(&format!(
            r#"
            SELECT season,
                   COUNT(*) AS count,
                   AVG(predicted_yield)::float8 AS avg_yield
            FROM crops
            WHERE {}
            GROUP BY season
            ORDER BY season
            "#,
            FILTER_CLAUSE
        ))
        .bind(filter.crop_type.map(|c| c.as_str()))
        .bind(filter.season.map(|s| s.as_str()))
        .bind(filter.state.as_deref())
        .bind(filter.district.as_deref())
        .fetch_all(&self.db)
        .await?;

        Ok(CropStatistics {
            overall,
            crop_distribution,
            seasonal_distribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_whitelist() {
        let field: CropSortField = serde_json::from_str("\"predictedYield\"").unwrap();
        assert_eq!(field.column(), "predicted_yield");
        assert!(serde_json::from_str::<CropSortField>("\"id; DROP TABLE crops\"").is_err());
        assert_eq!(CropSortField::default().column(), "created_at");
        assert_eq!(SortOrder::default().keyword(), "DESC");
    }

    #[test]
    fn test_decimal_conversions() {
        assert_eq!(to_f64(Decimal::new(648, 2)), 6.48);
        assert_eq!(to_f64(to_decimal(2.5)), 2.5);
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
    }
}
