//! Business logic services for the Crop Yield Platform

pub mod analytics;
pub mod crop;
pub mod historical;
pub mod prediction;
pub mod synthetic;

pub use analytics::AnalyticsService;
pub use crop::CropService;
pub use historical::{
    HistoricalComparator, HistoricalRecord, HistoricalSource, HistoryError, PgHistoricalSource,
    SimilarityQuery,
};
pub use prediction::PredictionService;
pub use synthetic::SyntheticHistory;
