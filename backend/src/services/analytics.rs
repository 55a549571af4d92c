//! Yield analytics over stored crop records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{CropType, Season};
use sqlx::PgPool;

use crate::error::AppResult;

/// Rows returned in `correlationData`
pub const CORRELATION_ROW_LIMIT: usize = 100;

/// Regions need at least this many measured records to rank
pub const MIN_REGION_RECORDS: i64 = 3;

/// Regions reported in `topRegions`
pub const TOP_REGION_LIMIT: i64 = 10;

/// Analytics service
#[derive(Clone)]
pub struct AnalyticsService {
    db: PgPool,
}

/// Analytics query parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsFilter {
    pub crop_type: Option<CropType>,
    pub season: Option<Season>,
    /// Case-insensitive substring of the state name
    pub state: Option<String>,
    /// Calendar year of record creation
    pub year: Option<i32>,
}

impl AnalyticsFilter {
    /// Inclusive creation-date bounds for the year filter
    pub fn year_bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self.year {
            Some(year) => (
                NaiveDate::from_ymd_opt(year, 1, 1),
                NaiveDate::from_ymd_opt(year, 12, 31),
            ),
            None => (None, None),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub year: i32,
    pub month: i32,
    pub avg_predicted_yield: Option<f64>,
    pub avg_actual_yield: Option<f64>,
    pub total_area: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationPoint {
    pub actual_yield: f64,
    pub rainfall: f64,
    pub avg_temperature: f64,
    pub total_fertilizer: f64,
    #[serde(rename = "pH")]
    pub ph: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RegionPerformance {
    pub state: String,
    pub district: String,
    pub avg_yield: f64,
    pub total_area: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    /// Records carrying an actual yield, before the correlation cap
    pub total_records: i64,
    pub analysis_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldAnalytics {
    pub monthly_trends: Vec<MonthlyTrend>,
    pub correlation_data: Vec<CorrelationPoint>,
    pub top_regions: Vec<RegionPerformance>,
    pub summary: AnalyticsSummary,
}

const FILTER_CLAUSE: &str = r#"
    ($1::text IS NULL OR crop_type = $1)
    AND ($2::text IS NULL OR season = $2)
    AND ($3::text IS NULL OR state ILIKE '%' || $3 || '%')
    AND ($4::date IS NULL OR created_at >= $4::date)
    AND ($5::date IS NULL OR created_at < $5::date + INTERVAL '1 day')
"#;

impl AnalyticsService {
    /// Create a new AnalyticsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Trends, factor correlations and top regions for matching records
    pub async fn yield_analytics(&self, filter: AnalyticsFilter) -> AppResult<YieldAnalytics> {
        let (from, to) = filter.year_bounds();
        let crop_type = filter.crop_type.map(|c| c.as_str());
        let season = filter.season.map(|s| s.as_str());
        let state = filter.state.as_deref();

        let monthly_trends = sqlx::query_as::<_, MonthlyTrend>(&format!(
            r#"
            SELECT EXTRACT(YEAR FROM created_at)::int4 AS year,
                   EXTRACT(MONTH FROM created_at)::int4 AS month,
                   AVG(predicted_yield)::float8 AS avg_predicted_yield,
                   AVG(actual_yield)::float8 AS avg_actual_yield,
                   COALESCE(SUM(area), 0)::float8 AS total_area,
                   COUNT(*) AS count
            FROM crops
            WHERE {}
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
            FILTER_CLAUSE
        ))
        .bind(crop_type)
        .bind(season)
        .bind(state)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;

        let total_records = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM crops WHERE {} AND actual_yield IS NOT NULL",
            FILTER_CLAUSE
        ))
        .bind(crop_type)
        .bind(season)
        .bind(state)
        .bind(from)
        .bind(to)
        .fetch_one(&self.db)
        .await?;

        let correlation_data = sqlx::query_as::<_, CorrelationPoint>(&format!(
            r#"
            SELECT actual_yield::float8 AS actual_yield,
                   rainfall::float8 AS rainfall,
                   temperature_average::float8 AS avg_temperature,
                   (fertilizer_nitrogen + fertilizer_phosphorus
                    + fertilizer_potassium + fertilizer_organic)::float8 AS total_fertilizer,
                   ph::float8 AS ph,
                   humidity::float8 AS humidity
            FROM crops
            WHERE {} AND actual_yield IS NOT NULL
            ORDER BY created_at DESC
            LIMIT $6
            "#,
            FILTER_CLAUSE
        ))
        .bind(crop_type)
        .bind(season)
        .bind(state)
        .bind(from)
        .bind(to)
        .bind(CORRELATION_ROW_LIMIT as i64)
        .fetch_all(&self.db)
        .await?;

        let top_regions = sqlx::query_as::<_, RegionPerformance>(&format!(
            r#"
            SELECT state,
                   district,
                   AVG(actual_yield)::float8 AS avg_yield,
                   COALESCE(SUM(area), 0)::float8 AS total_area,
                   COUNT(*) AS count
            FROM crops
            WHERE {} AND actual_yield IS NOT NULL
            GROUP BY state, district
            HAVING COUNT(*) >= $6
            ORDER BY avg_yield DESC
            LIMIT $7
            "#,
            FILTER_CLAUSE
        ))
        .bind(crop_type)
        .bind(season)
        .bind(state)
        .bind(from)
        .bind(to)
        .bind(MIN_REGION_RECORDS)
        .bind(TOP_REGION_LIMIT)
        .fetch_all(&self.db)
        .await?;

        tracing::debug!(
            records = total_records,
            months = monthly_trends.len(),
            regions = top_regions.len(),
            "Yield analytics computed"
        );

        Ok(YieldAnalytics {
            monthly_trends,
            correlation_data,
            top_regions,
            summary: AnalyticsSummary {
                total_records,
                analysis_date: Utc::now(),
            },
        })
    }
}
