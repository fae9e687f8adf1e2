pub mod database;
pub mod series_repository;

pub use database::Database;
pub use series_repository::SqliteSeriesRepository;
