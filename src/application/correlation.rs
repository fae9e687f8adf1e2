//! Contemporaneous and lagged cross-correlation over an aligned table.
//!
//! Correlations use the pairwise-complete-observations policy: each pair is
//! computed over exactly the axis positions where both columns are non-null,
//! independent of any third series. Undefined results (under two overlapping
//! points, or zero variance) are `None`, never coerced to 0.0.

use crate::domain::errors::ApiError;
use crate::domain::series::{AlignedTable, CorrelationMatrix, LaggedPair, SeriesColumn};

/// Minimum overlapping points for a Pearson correlation to be defined.
const MIN_OVERLAP: usize = 2;

/// Symmetric contemporaneous correlation matrix.
///
/// Each unordered pair is computed once and mirrored. The diagonal is 1.0
/// whenever the series has at least two non-null observations, `None`
/// otherwise. Fails fast if any column's length disagrees with the axis.
pub fn correlation_matrix(table: &AlignedTable) -> Result<CorrelationMatrix, ApiError> {
    check_column_lengths(table)?;

    let n = table.columns.len();
    let mut matrix = vec![vec![None; n]; n];

    for i in 0..n {
        // The diagonal is 1.0 by definition once the series can overlap
        // with itself, even for a constant series.
        if table.columns[i].present_count() >= MIN_OVERLAP {
            matrix[i][i] = Some(1.0);
        }
        for j in (i + 1)..n {
            let r = pearson(&table.columns[i].values, &table.columns[j].values, 0);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        series_ids: table
            .columns
            .iter()
            .map(|c| c.meta.series_id.clone())
            .collect(),
        display_names: table
            .columns
            .iter()
            .map(|c| c.meta.display_name.clone())
            .collect(),
        matrix,
    })
}

/// Optimal-lag cross-correlation for every unordered pair of distinct
/// columns, searching integer lags in `[-max_lag, +max_lag]`.
///
/// Sign convention: a positive lag means the first series leads the second —
/// a's value at axis position `i` is paired with b's value at `i + lag`.
/// The winning lag maximizes |correlation|; exact ties go to the lag
/// closest to zero, then to the positive one of the two.
///
/// A pair that never reaches two overlapping points at any lag comes back
/// as the no-signal marker (`correlation: None`, `optimal_lag: 0`).
pub fn lag_analysis(table: &AlignedTable, max_lag: i32) -> Result<Vec<LaggedPair>, ApiError> {
    check_column_lengths(table)?;
    if max_lag < 0 {
        return Err(ApiError::internal(format!(
            "negative max_lag: {max_lag}"
        )));
    }

    let mut pairs = Vec::new();
    for i in 0..table.columns.len() {
        for j in (i + 1)..table.columns.len() {
            pairs.push(best_lag(&table.columns[i], &table.columns[j], max_lag));
        }
    }
    Ok(pairs)
}

fn best_lag(a: &SeriesColumn, b: &SeriesColumn, max_lag: i32) -> LaggedPair {
    let mut best: Option<(f64, i32)> = None;

    for lag in -max_lag..=max_lag {
        let Some(r) = pearson(&a.values, &b.values, lag) else {
            continue;
        };
        let better = match best {
            None => true,
            Some((best_r, best_l)) => {
                if r.abs() != best_r.abs() {
                    r.abs() > best_r.abs()
                } else if lag.abs() != best_l.abs() {
                    // Tie on magnitude: prefer the lag closest to zero.
                    lag.abs() < best_l.abs()
                } else {
                    // Same distance from zero: prefer the positive lag.
                    lag > best_l
                }
            }
        };
        if better {
            best = Some((r, lag));
        }
    }

    match best {
        Some((correlation, optimal_lag)) => LaggedPair {
            series_a: a.meta.series_id.clone(),
            series_b: b.meta.series_id.clone(),
            correlation: Some(correlation),
            optimal_lag,
        },
        None => LaggedPair::no_signal(&a.meta.series_id, &b.meta.series_id),
    }
}

/// Pearson correlation of `a[i]` against `b[i + lag]` over the positions
/// where both sides are non-null. `None` when fewer than [`MIN_OVERLAP`]
/// positions overlap or either side has zero variance over the window.
fn pearson(a: &[Option<f64>], b: &[Option<f64>], lag: i32) -> Option<f64> {
    let n = a.len() as i64;
    let lag = lag as i64;

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for i in 0..n {
        let j = i + lag;
        if j < 0 || j >= b.len() as i64 {
            continue;
        }
        if let (Some(x), Some(y)) = (a[i as usize], b[j as usize]) {
            xs.push(x);
            ys.push(y);
        }
    }

    if xs.len() < MIN_OVERLAP {
        return None;
    }

    let len = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / len;
    let mean_y = ys.iter().sum::<f64>() / len;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

fn check_column_lengths(table: &AlignedTable) -> Result<(), ApiError> {
    for col in &table.columns {
        if col.values.len() != table.dates.len() {
            return Err(ApiError::internal(format!(
                "column '{}' has {} values for a {}-date axis",
                col.meta.series_id,
                col.values.len(),
                table.dates.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::align::align;
    use crate::domain::series::{Observation, SeriesMeta};
    use chrono::NaiveDate;

    fn monthly(id: &str, values: &[Option<f64>]) -> (SeriesMeta, Vec<Observation>) {
        let obs = values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| {
                v.map(|value| Observation {
                    date: NaiveDate::from_ymd_opt(2020, 1, 1)
                        .unwrap()
                        .checked_add_months(chrono::Months::new(i as u32))
                        .unwrap(),
                    value: Some(value),
                })
            })
            .collect();
        (SeriesMeta::bare(id), obs)
    }

    fn table(series: Vec<(SeriesMeta, Vec<Observation>)>) -> AlignedTable {
        align(series)
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let t = table(vec![
            monthly("A", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            monthly("B", &[Some(2.0), Some(4.0), Some(5.0), Some(9.0)]),
            monthly("C", &[Some(9.0), Some(7.0), Some(4.0), Some(2.0)]),
        ]);

        let m = correlation_matrix(&t).unwrap();
        for i in 0..3 {
            assert_eq!(m.matrix[i][i], Some(1.0));
            for j in 0..3 {
                assert_eq!(m.matrix[i][j], m.matrix[j][i]);
            }
        }
        // A and B move together, A and C in opposition.
        assert!(m.matrix[0][1].unwrap() > 0.9);
        assert!(m.matrix[0][2].unwrap() < -0.9);
    }

    #[test]
    fn pairwise_policy_ignores_third_series_gaps() {
        // C is null everywhere A and B overlap; listwise deletion would
        // leave A-B with no rows at all.
        let t = table(vec![
            monthly("A", &[Some(1.0), Some(2.0), Some(3.0), None]),
            monthly("B", &[Some(1.0), Some(2.0), Some(3.0), None]),
            monthly("C", &[None, None, None, Some(1.0)]),
        ]);

        let m = correlation_matrix(&t).unwrap();
        let ab = m.matrix[0][1].unwrap();
        assert!((ab - 1.0).abs() < 1e-12);
        // C overlaps nobody and has a single point: undefined everywhere.
        assert_eq!(m.matrix[0][2], None);
        assert_eq!(m.matrix[2][2], None);
    }

    #[test]
    fn zero_overlap_pair_is_undefined_not_zero() {
        let t = table(vec![
            monthly("A", &[Some(1.0), Some(2.0), None, None]),
            monthly("B", &[None, None, Some(5.0), Some(6.0)]),
        ]);

        let m = correlation_matrix(&t).unwrap();
        assert_eq!(m.matrix[0][1], None);
        // Both diagonals are still defined.
        assert_eq!(m.matrix[0][0], Some(1.0));
        assert_eq!(m.matrix[1][1], Some(1.0));
    }

    #[test]
    fn constant_series_diagonal_defined_offdiagonal_not() {
        let t = table(vec![
            monthly("A", &[Some(5.0), Some(5.0), Some(5.0)]),
            monthly("B", &[Some(1.0), Some(2.0), Some(3.0)]),
        ]);

        let m = correlation_matrix(&t).unwrap();
        assert_eq!(m.matrix[0][0], Some(1.0));
        assert_eq!(m.matrix[0][1], None, "zero variance must not fake a 0.0");
    }

    #[test]
    fn shifted_copy_reports_positive_lead() {
        // B is A shifted forward by 3 periods: A's past predicts B's
        // present, so A leads B with optimal_lag = +3.
        let base: Vec<Option<f64>> = [1.0, 3.0, 2.0, 5.0, 4.0, 7.0, 6.0, 9.0, 8.0, 11.0]
            .iter()
            .copied()
            .map(Some)
            .collect();
        let mut shifted = vec![None, None, None];
        shifted.extend(base.iter().take(base.len() - 3).copied());

        let t = table(vec![monthly("A", &base), monthly("B", &shifted)]);
        let pairs = lag_analysis(&t, 5).unwrap();

        assert_eq!(pairs.len(), 1);
        let p = &pairs[0];
        assert_eq!(p.optimal_lag, 3, "A should lead B by exactly 3 steps");
        assert!((p.correlation.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn lag_stays_within_bounds() {
        let t = table(vec![
            monthly("A", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]),
            monthly("B", &[Some(2.0), Some(1.0), Some(4.0), Some(3.0), Some(6.0)]),
        ]);
        let pairs = lag_analysis(&t, 2).unwrap();
        assert!(pairs[0].optimal_lag.abs() <= 2);
    }

    #[test]
    fn tie_breaks_prefer_zero_then_positive() {
        // A constant-increment pair correlates perfectly at every lag, so
        // every examined lag ties at |r| = 1 and the tie-break must land
        // on lag 0.
        let t = table(vec![
            monthly("A", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(6.0)]),
            monthly("B", &[Some(2.0), Some(4.0), Some(6.0), Some(8.0), Some(10.0), Some(12.0)]),
        ]);
        let pairs = lag_analysis(&t, 3).unwrap();
        assert_eq!(pairs[0].optimal_lag, 0);
        assert!((pairs[0].correlation.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn no_overlap_at_any_lag_is_no_signal() {
        let t = table(vec![
            monthly("A", &[Some(1.0), None, None, None, None, None]),
            monthly("B", &[None, None, None, None, None, Some(2.0)]),
        ]);
        let pairs = lag_analysis(&t, 2).unwrap();
        assert_eq!(pairs[0].correlation, None);
        assert_eq!(pairs[0].optimal_lag, 0);
    }

    #[test]
    fn mismatched_column_length_fails_fast() {
        let mut t = table(vec![
            monthly("A", &[Some(1.0), Some(2.0)]),
            monthly("B", &[Some(3.0), Some(4.0)]),
        ]);
        t.columns[1].values.pop();

        assert!(matches!(
            correlation_matrix(&t),
            Err(ApiError::Internal { .. })
        ));
        assert!(matches!(lag_analysis(&t, 2), Err(ApiError::Internal { .. })));
    }
}
