//! Request and response payload shapes for the JSON API.
//!
//! Responses are thin projections of the domain types: columns are
//! flattened (metadata fields inline rather than nested) to keep the
//! payloads chart-friendly.

use crate::application::pricing::{ExerciseStyle, OptionInputs, OptionType};
use crate::application::pricing::monte_carlo::VarianceReduction;
use crate::domain::series::{AlignedTable, CorrelationMatrix, LaggedPair, Observation, SeriesMeta};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesResponse {
    pub series_id: String,
    pub display_name: String,
    pub unit: String,
    pub frequency: String,
    pub observations: Vec<Observation>,
}

impl SeriesResponse {
    pub fn from_parts(meta: SeriesMeta, observations: Vec<Observation>) -> Self {
        Self {
            series_id: meta.series_id,
            display_name: meta.display_name,
            unit: meta.unit,
            frequency: meta.frequency,
            observations,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MultiSeriesRequest {
    pub series_ids: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub normalize: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlignedColumn {
    pub series_id: String,
    pub display_name: String,
    pub unit: String,
    pub values: Vec<Option<f64>>,
    /// True when normalization blanked the column (zero variance or fewer
    /// than two observations).
    pub degenerate: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiSeriesResponse {
    pub dates: Vec<NaiveDate>,
    pub series: Vec<AlignedColumn>,
}

impl From<AlignedTable> for MultiSeriesResponse {
    fn from(table: AlignedTable) -> Self {
        Self {
            dates: table.dates,
            series: table
                .columns
                .into_iter()
                .map(|c| AlignedColumn {
                    series_id: c.meta.series_id,
                    display_name: c.meta.display_name,
                    unit: c.meta.unit,
                    values: c.values,
                    degenerate: c.degenerate,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationRequest {
    pub series_ids: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub max_lag: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorrelationResponse {
    /// Zero-offset matrix; `null` entries mark undefined correlations.
    pub contemporaneous: CorrelationMatrix,
    /// One optimal-lag entry per unordered pair, strongest |correlation|
    /// first, no-signal pairs last. Positive lag = series_a leads.
    pub lagged: Vec<LaggedPair>,
}

impl CorrelationResponse {
    pub fn from_parts(contemporaneous: CorrelationMatrix, lagged: Vec<LaggedPair>) -> Self {
        Self {
            contemporaneous,
            lagged,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HistoryQuery {
    pub range: Option<HistoryRange>,
    pub interval: Option<HistoryInterval>,
}

/// Accepted Yahoo chart ranges; parsing up front keeps arbitrary strings
/// out of upstream requests.
#[derive(Debug, Clone, Copy, Deserialize)]
pub enum HistoryRange {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl HistoryRange {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::Max => "max",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub enum HistoryInterval {
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
    #[serde(rename = "1mo")]
    Monthly,
}

impl HistoryInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "1d",
            Self::Weekly => "1wk",
            Self::Monthly => "1mo",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    pub series_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    pub path: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PipelineTriggerRequest {
    #[serde(default)]
    pub full_sync: bool,
}

/// Contract terms shared by every option-pricing request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ContractParams {
    pub spot: f64,
    pub strike: f64,
    /// Time to expiration in years.
    pub expiry: f64,
    pub rate: f64,
    pub sigma: f64,
    pub option_type: OptionType,
}

impl ContractParams {
    pub fn to_inputs(self) -> OptionInputs {
        OptionInputs {
            spot: self.spot,
            strike: self.strike,
            expiry: self.expiry,
            rate: self.rate,
            sigma: self.sigma,
            option_type: self.option_type,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BinomialRequest {
    #[serde(flatten)]
    pub contract: ContractParams,
    #[serde(default = "default_exercise")]
    pub exercise: ExerciseStyle,
    #[serde(default = "default_steps")]
    pub steps: usize,
}

fn default_exercise() -> ExerciseStyle {
    ExerciseStyle::European
}

fn default_steps() -> usize {
    200
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MonteCarloRequest {
    #[serde(flatten)]
    pub contract: ContractParams,
    #[serde(default = "default_sims")]
    pub n_sims: usize,
    #[serde(default = "default_mc_steps")]
    pub n_steps: usize,
    #[serde(default)]
    pub variance_reduction: VarianceReduction,
    pub seed: Option<u64>,
}

fn default_sims() -> usize {
    10_000
}

fn default_mc_steps() -> usize {
    100
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ImpliedVolRequest {
    pub market_price: f64,
    pub spot: f64,
    pub strike: f64,
    pub expiry: f64,
    pub rate: f64,
    pub option_type: OptionType,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpliedVolResponse {
    pub implied_vol: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GreeksSurfaceRequest {
    #[serde(flatten)]
    pub contract: ContractParams,
    /// Spot sweep half-width as a fraction of spot (0.3 = +/-30%).
    #[serde(default = "default_surface_width")]
    pub spot_range_pct: f64,
    #[serde(default = "default_surface_points")]
    pub points: usize,
}

fn default_surface_width() -> f64 {
    0.3
}

fn default_surface_points() -> usize {
    41
}

#[derive(Debug, Clone, Serialize)]
pub struct GreeksSurfacePoint {
    pub spot: f64,
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GreeksSurfaceResponse {
    pub points: Vec<GreeksSurfacePoint>,
}
