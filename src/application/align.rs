//! Multi-series date alignment.
//!
//! Outer-joins heterogeneous series onto one sorted, deduplicated date axis.
//! Gaps stay gaps: a date the series never reported becomes an explicit
//! `None` slot, never a forward-filled value. Filling is the ingestion
//! layer's job; fabricating values in API responses would mislead callers.

use crate::domain::series::{AlignedTable, Observation, SeriesColumn, SeriesMeta};
use std::collections::{BTreeSet, HashMap};

/// Align the given series onto the union of their observation dates.
///
/// The axis is the sorted, deduplicated union of every input date. Each
/// series becomes a column with exactly one slot per axis date. A series
/// with zero observations yields an all-null column over whatever axis the
/// other series contribute; an empty input list yields an empty table.
///
/// If a series carries duplicate dates the last observation wins.
pub fn align(series: Vec<(SeriesMeta, Vec<Observation>)>) -> AlignedTable {
    let axis: BTreeSet<_> = series
        .iter()
        .flat_map(|(_, obs)| obs.iter().map(|o| o.date))
        .collect();
    let dates: Vec<_> = axis.into_iter().collect();

    let index: HashMap<_, _> = dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let columns = series
        .into_iter()
        .map(|(meta, observations)| {
            let mut values = vec![None; dates.len()];
            for obs in observations {
                // Every observation date is in the union by construction.
                if let Some(&slot) = index.get(&obs.date) {
                    values[slot] = obs.value;
                }
            }
            SeriesColumn::new(meta, values)
        })
        .collect();

    AlignedTable { dates, columns }
}
