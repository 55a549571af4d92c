//! PostgreSQL-backed service tests
//!
//! Each test gets a fresh database with migrations applied. They need a
//! server reachable through `DATABASE_URL`; run with `cargo test -- --ignored`.
//!
//! Covers:
//! - Similarity query filter, ordering and limit
//! - Empty history reported from the store, not simulated
//! - Crop record lifecycle, listing filters and statistics
//! - Analytics region threshold and correlation rows

use chrono::NaiveDate;
use crop_yield_backend::services::analytics::AnalyticsFilter;
use crop_yield_backend::services::crop::{CropFilter, ListCropsQuery};
use crop_yield_backend::services::historical::summarize;
use crop_yield_backend::services::{
    AnalyticsService, CropService, HistoricalComparator, HistoricalSource, PgHistoricalSource,
    SimilarityQuery, SyntheticHistory,
};
use crop_yield_backend::AppError;
use shared::models::{
    ComparisonSource, CropObservation, CropType, Fertilizer, Location, Season, SoilType,
    Temperature,
};
use sqlx::PgPool;
use std::sync::Arc;

// ============================================================================
// Fixtures
// ============================================================================

fn observation(crop_type: CropType, season: Season, state: &str, actual: Option<f64>) -> CropObservation {
    CropObservation {
        crop_type,
        season,
        area: 2.0,
        rainfall: 1200.0,
        temperature: Temperature {
            average: 26.0,
            min: 20.0,
            max: 32.0,
        },
        humidity: 70.0,
        fertilizer: Fertilizer {
            nitrogen: 60.0,
            phosphorus: 30.0,
            potassium: 20.0,
            organic: 0.0,
        },
        soil_type: SoilType::Loamy,
        ph: 6.8,
        location: Location {
            state: state.to_string(),
            district: "Ludhiana".to_string(),
            coordinates: None,
        },
        planting_date: NaiveDate::from_ymd_opt(2024, 6, 15),
        harvest_date: NaiveDate::from_ymd_opt(2024, 10, 20),
        actual_yield: actual,
        notes: None,
    }
}

fn rice(state: &str, actual: Option<f64>) -> CropObservation {
    observation(CropType::Rice, Season::Kharif, state, actual)
}

async fn seed(crops: &CropService, observations: Vec<CropObservation>) {
    for obs in observations {
        crops.create(obs).await.unwrap();
    }
}

// ============================================================================
// Historical Source
// ============================================================================

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_similarity_filters_orders_and_limits(pool: PgPool) {
    let crops = CropService::new(pool.clone());
    seed(
        &crops,
        vec![
            rice("Punjab", Some(5.0)),
            rice("Punjab", Some(6.0)),
            rice("Punjab", None),
            observation(CropType::Wheat, Season::Rabi, "Punjab", Some(3.0)),
            rice("Haryana", Some(4.0)),
            rice("Punjab", Some(7.0)),
            rice("PUNJAB", Some(8.0)),
        ],
    )
    .await;

    let source = PgHistoricalSource::new(pool);
    let query = SimilarityQuery::for_observation(&rice("punjab", None), 3);
    let records = source.find_similar(&query).await.unwrap();

    let yields: Vec<f64> = records.iter().map(|r| r.actual_yield).collect();
    assert_eq!(yields, vec![8.0, 7.0, 6.0]);
    assert!(records.iter().all(|r| r.area == 2.0));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_no_similar_records_is_reported_from_store(pool: PgPool) {
    let crops = CropService::new(pool.clone());
    seed(&crops, vec![rice("Punjab", Some(5.0))]).await;

    let source = PgHistoricalSource::new(pool);
    let query = SimilarityQuery::for_observation(&rice("Kerala", None), 10);
    assert!(source.find_similar(&query).await.unwrap().is_empty());

    let comparison = HistoricalComparator::new(SyntheticHistory::seeded(1))
        .with_source(Arc::new(source))
        .compare(&rice("Kerala", None))
        .await;
    assert_eq!(comparison.source, ComparisonSource::Database);
    assert_eq!(comparison.record_count, 0);
    assert_eq!(comparison, summarize(&[]));
}

// ============================================================================
// Crop Records
// ============================================================================

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_crop_lifecycle(pool: PgPool) {
    let crops = CropService::new(pool);

    let created = crops.create(rice("Punjab", Some(5.5))).await.unwrap();
    assert_eq!(created.observation, rice("Punjab", Some(5.5)));
    assert_eq!(created.growing_period, Some(127));
    assert!(created.predicted_yield.is_some());

    let fetched = crops.get(created.id).await.unwrap();
    assert_eq!(fetched.observation, created.observation);

    let mut changed = rice("Punjab", Some(6.1));
    changed.soil_type = SoilType::Desert;
    let updated = crops.update(created.id, changed).await.unwrap();
    assert_eq!(updated.observation.actual_yield, Some(6.1));
    assert!(updated.predicted_yield < created.predicted_yield);

    crops.delete(created.id).await.unwrap();
    assert!(matches!(crops.get(created.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(crops.delete(created.id).await, Err(AppError::NotFound(_))));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_requires_planting_date(pool: PgPool) {
    let crops = CropService::new(pool);
    let mut obs = rice("Punjab", None);
    obs.planting_date = None;
    obs.harvest_date = None;

    assert!(matches!(
        crops.create(obs).await,
        Err(AppError::Validation { field, .. }) if field == "plantingDate"
    ));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_filters_and_paginates(pool: PgPool) {
    let crops = CropService::new(pool);
    seed(
        &crops,
        vec![
            rice("Punjab", Some(5.0)),
            rice("Punjab", Some(6.0)),
            rice("Punjab", Some(7.0)),
            rice("Haryana", Some(4.0)),
        ],
    )
    .await;

    let page = crops
        .list(ListCropsQuery {
            state: Some("punj".to_string()),
            limit: Some(2),
            ..ListCropsQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(page.crops.len(), 2);
    assert_eq!(page.pagination.total, 3);
    assert_eq!(page.pagination.pages, 2);
    assert!(page.pagination.has_next);
    assert!(page.crops.iter().all(|c| c.observation.location.state == "Punjab"));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_statistics_group_by_crop_and_season(pool: PgPool) {
    let crops = CropService::new(pool);
    seed(
        &crops,
        vec![
            rice("Punjab", Some(5.0)),
            rice("Punjab", Some(7.0)),
            observation(CropType::Wheat, Season::Rabi, "Punjab", Some(3.0)),
        ],
    )
    .await;

    let stats = crops.statistics(CropFilter::default()).await.unwrap();
    assert_eq!(stats.overall.total_crops, 3);
    assert_eq!(stats.overall.total_area, 6.0);
    assert_eq!(stats.overall.avg_actual_yield, 5.0);
    assert_eq!(stats.crop_distribution[0].crop_type, "Rice");
    assert_eq!(stats.crop_distribution[0].count, 2);
    assert_eq!(stats.seasonal_distribution.len(), 2);

    let rice_only = crops
        .statistics(CropFilter {
            crop_type: Some(CropType::Rice),
            ..CropFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(rice_only.overall.total_crops, 2);
}

// ============================================================================
// Analytics
// ============================================================================

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_analytics_region_threshold(pool: PgPool) {
    let crops = CropService::new(pool.clone());
    seed(
        &crops,
        vec![
            rice("Punjab", Some(5.0)),
            rice("Punjab", Some(6.0)),
            rice("Punjab", Some(7.0)),
            rice("Haryana", Some(9.0)),
            rice("Haryana", None),
        ],
    )
    .await;

    let analytics = AnalyticsService::new(pool)
        .yield_analytics(AnalyticsFilter::default())
        .await
        .unwrap();

    assert_eq!(analytics.summary.total_records, 4);
    assert_eq!(analytics.correlation_data.len(), 4);
    assert_eq!(analytics.correlation_data[0].total_fertilizer, 110.0);
    assert_eq!(analytics.top_regions.len(), 1);
    assert_eq!(analytics.top_regions[0].state, "Punjab");
    assert_eq!(analytics.top_regions[0].avg_yield, 6.0);
    assert_eq!(analytics.monthly_trends.iter().map(|m| m.count).sum::<i64>(), 5);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_analytics_on_empty_store(pool: PgPool) {
    let analytics = AnalyticsService::new(pool)
        .yield_analytics(AnalyticsFilter {
            year: Some(1999),
            ..AnalyticsFilter::default()
        })
        .await
        .unwrap();

    assert!(analytics.monthly_trends.is_empty());
    assert!(analytics.correlation_data.is_empty());
    assert!(analytics.top_regions.is_empty());
    assert_eq!(analytics.summary.total_records, 0);
}
