pub mod errors;
pub mod repositories;
pub mod series;
