//! Per-column z-score normalization, applied after alignment when the
//! caller wants indicators of different scales on one chart axis.

use crate::domain::series::SeriesColumn;

/// Unit label stamped on every normalized column, whatever the original was.
pub const ZSCORE_UNIT: &str = "Z-Score";

/// Z-score a column: each non-null value becomes `(v - mean) / stddev`,
/// with mean and population standard deviation taken over the non-null
/// values only. Null slots stay null.
///
/// A degenerate column (fewer than two non-null points, or zero variance)
/// comes back all-null with `degenerate` set; never a division by zero,
/// never an infinity leaking into a payload.
pub fn normalize(column: &SeriesColumn) -> SeriesColumn {
    let mut meta = column.meta.clone();
    meta.unit = ZSCORE_UNIT.to_string();

    let present: Vec<f64> = column.values.iter().flatten().copied().collect();

    let stats = population_stats(&present);
    let Some((mean, std_dev)) = stats.filter(|(_, sd)| *sd > 0.0) else {
        return SeriesColumn {
            meta,
            values: vec![None; column.values.len()],
            degenerate: true,
        };
    };

    let values = column
        .values
        .iter()
        .map(|slot| slot.map(|v| (v - mean) / std_dev))
        .collect();

    SeriesColumn {
        meta,
        values,
        degenerate: false,
    }
}

/// Mean and population standard deviation; `None` below two samples.
fn population_stats(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}
