pub mod export;
pub mod fred;
pub mod ingest;
pub mod persistence;
pub mod repositories;
pub mod yahoo;
