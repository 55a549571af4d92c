//! Historical comparison against similar past crop records
//!
//! The comparator asks a [`HistoricalSource`] for records sharing crop type,
//! season and state. When no source is configured, or the source fails or
//! misses its deadline, a [`SyntheticHistory`] stands in and the result is
//! tagged as synthetic.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::engine::round2;
use shared::models::{
    ComparableRecord, ComparisonSource, CropObservation, CropType, HistoricalComparison, Season,
    YieldRange,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use super::synthetic::SyntheticHistory;

/// Message reported when the store answered with no similar records
pub const NO_HISTORY_MESSAGE: &str = "No historical data available for similar conditions";

/// Default number of similar records fetched per comparison
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Default deadline for the similarity query
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Records reported back in `recentCrops`
const RECENT_RECORDS: usize = 5;

/// Failures of a historical source; always recovered by the comparator
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Historical query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Historical query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Historical source unavailable: {0}")]
    Unavailable(String),
}

/// Selection criteria for comparable records
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityQuery {
    pub crop_type: CropType,
    pub season: Season,
    pub state: String,
    pub limit: u32,
}

impl SimilarityQuery {
    pub fn for_observation(observation: &CropObservation, limit: u32) -> Self {
        Self {
            crop_type: observation.crop_type,
            season: observation.season,
            state: observation.location.state.clone(),
            limit,
        }
    }
}

/// A past record that carries a measured yield
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct HistoricalRecord {
    pub id: Uuid,
    pub actual_yield: f64,
    pub predicted_yield: Option<f64>,
    pub area: f64,
    pub planting_date: Option<NaiveDate>,
}

/// Read-only access to past observations
#[async_trait]
pub trait HistoricalSource: Send + Sync {
    /// Up to `query.limit` matching records with an actual yield, most recent first
    async fn find_similar(&self, query: &SimilarityQuery) -> Result<Vec<HistoricalRecord>, HistoryError>;
}

/// Historical source backed by the `crops` table
#[derive(Clone)]
pub struct PgHistoricalSource {
    db: PgPool,
}

impl PgHistoricalSource {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HistoricalSource for PgHistoricalSource {
    async fn find_similar(&self, query: &SimilarityQuery) -> Result<Vec<HistoricalRecord>, HistoryError> {
        let records = sqlx::query_as::<_, HistoricalRecord>(
            r#"
            SELECT id,
                   actual_yield::float8 AS actual_yield,
                   predicted_yield::float8 AS predicted_yield,
                   area::float8 AS area,
                   planting_date
            FROM crops
            WHERE crop_type = $1
              AND season = $2
              AND LOWER(state) = LOWER($3)
              AND actual_yield IS NOT NULL
            ORDER BY created_at DESC
            LIMIT $4
            "#,
        )
        .bind(query.crop_type.as_str())
        .bind(query.season.as_str())
        .bind(&query.state)
        .bind(i64::from(query.limit))
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }
}

/// Prediction accuracy of a past record as an integer percentage
///
/// `None` when either yield is missing or zero.
pub fn accuracy_percent(predicted: Option<f64>, actual: Option<f64>) -> Option<i64> {
    match (predicted, actual) {
        (Some(p), Some(a)) if p != 0.0 && a != 0.0 => {
            Some(((1.0 - (p - a).abs() / a) * 100.0).round() as i64)
        }
        _ => None,
    }
}

/// Summarize records returned by a source
pub fn summarize(records: &[HistoricalRecord]) -> HistoricalComparison {
    if records.is_empty() {
        return HistoricalComparison::empty(NO_HISTORY_MESSAGE);
    }

    let yields = records.iter().map(|r| r.actual_yield);
    let average = yields.clone().sum::<f64>() / records.len() as f64;
    let min = yields.clone().fold(f64::INFINITY, f64::min);
    let max = yields.fold(f64::NEG_INFINITY, f64::max);

    let recent_crops = records
        .iter()
        .take(RECENT_RECORDS)
        .map(|r| ComparableRecord {
            id: r.id.to_string(),
            actual_yield: Some(r.actual_yield),
            predicted_yield: r.predicted_yield,
            area: r.area,
            planting_date: r.planting_date,
            accuracy: accuracy_percent(r.predicted_yield, Some(r.actual_yield)),
        })
        .collect();

    HistoricalComparison {
        average_yield: Some(round2(average)),
        record_count: records.len() as u32,
        yield_range: YieldRange {
            min: Some(round2(min)),
            max: Some(round2(max)),
        },
        recent_crops,
        message: None,
        source: ComparisonSource::Database,
    }
}

/// Compares an observation against similar history, falling back to
/// simulated statistics when the source cannot answer
#[derive(Clone)]
pub struct HistoricalComparator {
    source: Option<Arc<dyn HistoricalSource>>,
    synthetic: Arc<SyntheticHistory>,
    timeout: Duration,
    limit: u32,
}

impl HistoricalComparator {
    /// Comparator with no source; every comparison is synthetic until one is set
    pub fn new(synthetic: SyntheticHistory) -> Self {
        Self {
            source: None,
            synthetic: Arc::new(synthetic),
            timeout: DEFAULT_QUERY_TIMEOUT,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn HistoricalSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Whether a real source is plugged in
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Summary of similar past records; never fails
    pub async fn compare(&self, observation: &CropObservation) -> HistoricalComparison {
        let Some(source) = &self.source else {
            return self.synthetic.generate(observation.crop_type);
        };

        let query = SimilarityQuery::for_observation(observation, self.limit);
        let outcome = match tokio::time::timeout(self.timeout, source.find_similar(&query)).await {
            Ok(result) => result,
            Err(_) => Err(HistoryError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(records) => {
                tracing::debug!(
                    crop_type = %query.crop_type,
                    season = %query.season,
                    state = %query.state,
                    records = records.len(),
                    "Historical records found"
                );
                summarize(&records)
            }
            Err(e) => {
                tracing::warn!("Falling back to synthetic history: {}", e);
                self.synthetic.generate(observation.crop_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(actual: f64, predicted: Option<f64>) -> HistoricalRecord {
        HistoricalRecord {
            id: Uuid::new_v4(),
            actual_yield: actual,
            predicted_yield: predicted,
            area: 2.0,
            planting_date: NaiveDate::from_ymd_opt(2024, 6, 15),
        }
    }

    #[test]
    fn test_accuracy_percent() {
        assert_eq!(accuracy_percent(Some(4.5), Some(5.0)), Some(90));
        assert_eq!(accuracy_percent(Some(5.5), Some(5.0)), Some(90));
        assert_eq!(accuracy_percent(Some(4.0), Some(0.0)), None);
        assert_eq!(accuracy_percent(None, Some(5.0)), None);
        assert_eq!(accuracy_percent(Some(0.0), Some(5.0)), None);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.average_yield, None);
        assert_eq!(summary.yield_range, YieldRange::default());
        assert_eq!(summary.message.as_deref(), Some(NO_HISTORY_MESSAGE));
        assert_eq!(summary.source, ComparisonSource::Database);
    }

    #[test]
    fn test_summarize_statistics() {
        let records = vec![
            record(4.0, Some(4.4)),
            record(5.0, None),
            record(6.333, Some(6.0)),
        ];
        let summary = summarize(&records);

        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.average_yield, Some(5.11));
        assert_eq!(summary.yield_range.min, Some(4.0));
        assert_eq!(summary.yield_range.max, Some(6.33));
        assert_eq!(summary.recent_crops.len(), 3);
        assert_eq!(summary.recent_crops[0].accuracy, Some(90));
        assert_eq!(summary.recent_crops[1].accuracy, None);
        assert!(summary.message.is_none());
    }

    #[test]
    fn test_summarize_reports_at_most_five_recent() {
        let records: Vec<_> = (0..8).map(|i| record(3.0 + i as f64, None)).collect();
        let summary = summarize(&records);
        assert_eq!(summary.record_count, 8);
        assert_eq!(summary.recent_crops.len(), 5);
        assert_eq!(summary.recent_crops[0].actual_yield, Some(3.0));
    }
}
