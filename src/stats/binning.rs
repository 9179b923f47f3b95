//! Per-distance-bin medians and standard deviations.

use serde::{Deserialize, Serialize};

use crate::domain::TimeSeriesTable;
use crate::error::HelioError;
use crate::stats::summary::{median, std_dev};

pub const DISTANCE_COLUMN: &str = "Distance";
pub const DEFAULT_BIN_COUNT: usize = 10;

/// One bin `[lower, upper)`; the last bin also contains `upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceBin {
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
}

impl DistanceBin {
    pub fn contains(&self, d: f64) -> bool {
        d >= self.lower && (d < self.upper || (self.upper >= 1.0 && d <= self.upper))
    }
}

/// One statistic per bin (rows) and column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedTable {
    pub bins: Vec<DistanceBin>,
    pub columns: Vec<String>,
    /// `values[bin][column]`.
    pub values: Vec<Vec<f64>>,
}

impl BinnedTable {
    /// One column across all bins.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let j = self.columns.iter().position(|c| c == name)?;
        Some(self.values.iter().map(|row| row[j]).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceSummary {
    pub median: BinnedTable,
    pub std: BinnedTable,
    /// Rows per bin.
    pub counts: Vec<usize>,
    /// Rows outside [0, 1] or with NaN distance.
    pub dropped: usize,
}

/// Equal-width bins over [0, 1].
pub fn distance_bins(counts: usize) -> Result<Vec<DistanceBin>, HelioError> {
    if counts == 0 {
        return Err(HelioError::validation("bin count must be > 0"));
    }
    let n = counts as f64;
    Ok((0..counts)
        .map(|i| DistanceBin {
            index: i,
            lower: i as f64 / n,
            upper: (i + 1) as f64 / n,
        })
        .collect())
}

/// Bin index for a distance, or `None` when it falls outside [0, 1].
fn bin_index(d: f64, counts: usize) -> Option<usize> {
    if !(0.0..=1.0).contains(&d) {
        return None;
    }
    let n = counts as f64;
    let mut b = ((d * n).floor() as usize).min(counts - 1);
    // Keep the index consistent with the `i / n` edges despite rounding in `d * n`.
    if b > 0 && d < b as f64 / n {
        b -= 1;
    } else if b + 1 < counts && d >= (b + 1) as f64 / n {
        b += 1;
    }
    Some(b)
}

/// Group rows by the `Distance` column into `counts` bins over [0, 1] and
/// summarise every column per bin.
///
/// Rows with a distance outside [0, 1] (or NaN) belong to no bin and are
/// left out of both summaries. Empty bins still appear, with NaN values.
pub fn bin_distance(table: &TimeSeriesTable, counts: usize) -> Result<DistanceSummary, HelioError> {
    let bins = distance_bins(counts)?;
    let distance = table
        .column(DISTANCE_COLUMN)
        .ok_or_else(|| HelioError::validation(format!("table has no '{DISTANCE_COLUMN}' column")))?;

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); counts];
    let mut dropped = 0usize;
    for (row, &d) in distance.iter().enumerate() {
        match bin_index(d, counts) {
            Some(b) => members[b].push(row),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::debug!("bin_distance: {dropped} row(s) outside [0, 1] dropped");
    }

    let columns: Vec<String> = table.column_names().map(str::to_string).collect();
    let mut medians = Vec::with_capacity(counts);
    let mut stds = Vec::with_capacity(counts);
    let mut scratch = Vec::new();

    for rows in &members {
        let mut med_row = Vec::with_capacity(columns.len());
        let mut std_row = Vec::with_capacity(columns.len());
        for col in table.columns() {
            scratch.clear();
            scratch.extend(rows.iter().map(|&r| col.values[r]));
            med_row.push(median(&scratch));
            std_row.push(std_dev(&scratch));
        }
        medians.push(med_row);
        stds.push(std_row);
    }

    Ok(DistanceSummary {
        median: BinnedTable {
            bins: bins.clone(),
            columns: columns.clone(),
            values: medians,
        },
        std: BinnedTable {
            bins,
            columns,
            values: stds,
        },
        counts: members.iter().map(Vec::len).collect(),
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn table_with_distance(distance: Vec<f64>) -> TimeSeriesTable {
        let t0: DateTime<Utc> = Utc.with_ymd_and_hms(2022, 2, 25, 0, 0, 0).unwrap();
        let times = (0..distance.len() as i64).map(|i| t0 + Duration::minutes(i)).collect();
        let speed = distance.iter().map(|d| 300.0 + 100.0 * d).collect();
        TimeSeriesTable::new(times)
            .with_column("Distance", distance)
            .unwrap()
            .with_column("V_R", speed)
            .unwrap()
    }

    #[test]
    fn ten_bins_over_uniform_distances() {
        let distance: Vec<f64> = (0..100).map(|i| i as f64 / 99.0).collect();
        let summary = bin_distance(&table_with_distance(distance), DEFAULT_BIN_COUNT).unwrap();

        assert_eq!(summary.median.bins.len(), 10);
        assert_eq!(summary.dropped, 0);
        assert_eq!(summary.counts.iter().sum::<usize>(), 100);
        assert!(summary.counts.iter().all(|&c| c > 0));

        let med = summary.median.column("Distance").unwrap();
        for (bin, m) in summary.median.bins.iter().zip(&med) {
            assert!(bin.contains(*m), "median {m} outside [{}, {}]", bin.lower, bin.upper);
        }
        // Bins ascend.
        assert!(med.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn both_ends_are_included() {
        let summary = bin_distance(&table_with_distance(vec![0.0, 1.0]), 4).unwrap();
        assert_eq!(summary.counts, vec![1, 0, 0, 1]);
        assert_eq!(summary.dropped, 0);
    }

    #[test]
    fn out_of_range_rows_are_dropped() {
        let summary = bin_distance(&table_with_distance(vec![-0.1, 0.25, 1.2, f64::NAN]), 2).unwrap();
        assert_eq!(summary.dropped, 3);
        assert_eq!(summary.counts, vec![1, 0]);
        let v = summary.median.column("V_R").unwrap();
        assert_eq!(v[0], 325.0);
        assert!(v[1].is_nan());
    }

    #[test]
    fn std_per_bin() {
        let summary = bin_distance(&table_with_distance(vec![0.1, 0.2, 0.3, 0.9]), 2).unwrap();
        let s = summary.std.column("V_R").unwrap();
        assert!((s[0] - 10.0).abs() < 1e-9);
        assert!(s[1].is_nan(), "single-row bin has undefined sample std");
    }

    #[test]
    fn bin_edges_are_exact() {
        let bins = distance_bins(10).unwrap();
        assert_eq!(bins[3].lower, 0.3);
        assert_eq!(bins[9].upper, 1.0);
        assert_eq!(bin_index(0.3, 10), Some(3));
        assert_eq!(bin_index(1.0, 10), Some(9));
    }

    #[test]
    fn validation() {
        let table = table_with_distance(vec![0.5]);
        assert!(matches!(bin_distance(&table, 0), Err(HelioError::Validation(_))));

        let no_distance = TimeSeriesTable::new(Vec::new());
        assert!(matches!(bin_distance(&no_distance, 10), Err(HelioError::Validation(_))));
    }
}
