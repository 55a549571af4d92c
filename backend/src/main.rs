//! Crop Yield Platform - Backend Server
//!
//! Estimates crop yields from agronomic observations and compares them
//! against similar historical records.

use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crop_yield_backend::{
    config::{Config, HistoricalSourceMode},
    create_app,
    services::{HistoricalComparator, PgHistoricalSource, PredictionService, SyntheticHistory},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crop_yield_server=debug,crop_yield_backend=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Crop Yield Prediction Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Historical source: {}", config.prediction.historical_source);

    let db_pool = match config.prediction.historical_source {
        HistoricalSourceMode::Database => {
            let pool = config.database.lazy_pool()?;
            tracing::info!("Database pool configured; connections open on first use");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                match sqlx::migrate!("./migrations").run(&pool).await {
                    Ok(()) => tracing::info!("Migrations completed"),
                    Err(e) => tracing::warn!("Migrations failed: {}", e),
                }
            }
            Some(pool)
        }
        HistoricalSourceMode::Synthetic => {
            tracing::warn!("No database configured; historical comparisons will be simulated");
            None
        }
    };

    let mut comparator = HistoricalComparator::new(SyntheticHistory::from_entropy())
        .with_timeout(Duration::from_millis(config.prediction.query_timeout_ms))
        .with_limit(config.prediction.history_limit);
    if let Some(pool) = &db_pool {
        comparator = comparator.with_source(Arc::new(PgHistoricalSource::new(pool.clone())));
    }

    let predictions = PredictionService::new(comparator)
        .with_max_recommendations(config.prediction.max_recommendations)
        .with_policy(config.prediction.confidence.clone());

    // Create application state
    let state = AppState {
        db: db_pool,
        config: Arc::new(config.clone()),
        predictions,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
