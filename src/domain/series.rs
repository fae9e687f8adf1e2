//! Core time-series value types shared by the alignment engine, the
//! repositories, and the API layer.
//!
//! Everything here is request-scoped: built fresh from the repository per
//! call, held for the duration of the response, never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated observation. `value` is `None` when the provider reported
/// a slot for the date but no usable number (FRED encodes these as ".").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value: Some(value),
        }
    }

    pub fn absent(date: NaiveDate) -> Self {
        Self { date, value: None }
    }
}

/// Descriptive metadata for a tracked series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesMeta {
    pub series_id: String,
    pub display_name: String,
    pub unit: String,
    pub frequency: String,
}

impl SeriesMeta {
    /// Minimal metadata for a series known only by its identifier.
    pub fn bare(series_id: impl Into<String>) -> Self {
        let series_id = series_id.into();
        Self {
            display_name: series_id.clone(),
            series_id,
            unit: String::new(),
            frequency: String::new(),
        }
    }
}

/// One column of an [`AlignedTable`]: a value slot per axis date, `None`
/// where the series has no observation on that date.
///
/// `degenerate` is set by normalization when the column had zero variance
/// (or fewer than two points) and was therefore blanked out instead of
/// divided by zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesColumn {
    pub meta: SeriesMeta,
    pub values: Vec<Option<f64>>,
    pub degenerate: bool,
}

impl SeriesColumn {
    pub fn new(meta: SeriesMeta, values: Vec<Option<f64>>) -> Self {
        Self {
            meta,
            values,
            degenerate: false,
        }
    }

    /// Number of non-null slots.
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// Multiple series outer-joined onto one shared date axis.
///
/// Invariants (enforced by the aligner, checked by the correlation engine):
/// the axis is strictly increasing with no duplicates, and every column has
/// exactly `dates.len()` value slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlignedTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<SeriesColumn>,
}

impl AlignedTable {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.columns.is_empty()
    }
}

/// Symmetric contemporaneous correlation matrix over the requested series.
///
/// `None` entries mean the correlation is undefined for that pair (fewer
/// than two overlapping non-null observations, or zero variance). They are
/// deliberately distinct from a valid `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub series_ids: Vec<String>,
    pub display_names: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

/// Cross-correlation between two series at their optimal lag.
///
/// Sign convention: `optimal_lag > 0` means `series_a` leads `series_b` by
/// that many axis steps (a's value at position `i` is paired with b's value
/// at position `i + lag`).
///
/// `correlation == None` is the no-signal marker: the pair never had two
/// overlapping observations at any examined lag, and `optimal_lag` is 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaggedPair {
    pub series_a: String,
    pub series_b: String,
    pub correlation: Option<f64>,
    pub optimal_lag: i32,
}

impl LaggedPair {
    pub fn no_signal(series_a: impl Into<String>, series_b: impl Into<String>) -> Self {
        Self {
            series_a: series_a.into(),
            series_b: series_b.into(),
            correlation: None,
            optimal_lag: 0,
        }
    }
}

/// One entry of the series catalog exposed to the selector UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub series_id: String,
    pub display_name: String,
    pub unit: String,
    pub frequency: String,
    pub category: String,
    pub observation_count: i64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}
