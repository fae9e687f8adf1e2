pub mod align;
pub mod correlation;
pub mod indicators;
pub mod macro_service;
pub mod normalize;
pub mod pricing;
