//! Numeric conversion and per-row L2 distance.
//!
//! Rows are aligned purely by position: row `i` of the ground truth is
//! compared with row `i` of the measured table. No key or timestamp column
//! is consulted.

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::loaders::{CsvTable, TableRole};
use super::validation::{validate_columns, ValidationError, EXPECTED_COLUMNS};

/// Errors that can occur while converting tables or computing distances.
#[derive(Error, Debug)]
pub enum DistanceError {
    #[error(transparent)]
    Shape(#[from] ValidationError),

    #[error("{role} table '{path}': row {row}, column {column}: cannot convert {value:?} to a number")]
    NonNumeric {
        role: TableRole,
        path: String,
        row: usize,
        column: usize,
        value: String,
    },

    #[error("row count mismatch: ground truth has {ground_truth} rows, measured has {measured}")]
    LengthMismatch { ground_truth: usize, measured: usize },
}

/// Result type for distance operations.
pub type Result<T> = std::result::Result<T, DistanceError>;

/// How to treat two tables with different row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    /// Compare the common prefix and ignore excess rows.
    #[default]
    Truncate,
    /// Refuse to compare tables of different lengths.
    Strict,
}

/// Ordered sequence of (x, y, z) positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionTable {
    rows: Vec<[f64; 3]>,
}

impl PositionTable {
    /// Creates a position table from coordinate rows.
    pub fn from_rows(rows: Vec<[f64; 3]>) -> Self {
        Self { rows }
    }

    /// Convert a loaded table to numeric positions.
    ///
    /// The table must have exactly three columns. Every cell must parse as
    /// `f64`; the first cell that does not is reported with its row and
    /// column (both zero-based).
    pub fn from_table(table: &CsvTable, role: TableRole) -> Result<Self> {
        validate_columns(table, role)?;

        let mut rows = Vec::with_capacity(table.num_rows());
        for (row_idx, record) in table.rows.iter().enumerate() {
            if record.len() != EXPECTED_COLUMNS {
                return Err(ValidationError::ShapeMismatch {
                    role,
                    path: table.source_display(),
                    expected: EXPECTED_COLUMNS,
                    found: record.len(),
                }
                .into());
            }

            let mut position = [0.0f64; 3];
            for (col_idx, cell) in record.iter().enumerate() {
                position[col_idx] = cell.parse().map_err(|_| DistanceError::NonNumeric {
                    role,
                    path: table.source_display(),
                    row: row_idx,
                    column: col_idx,
                    value: cell.clone(),
                })?;
            }
            rows.push(position);
        }

        Ok(Self { rows })
    }

    /// Returns the number of positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table holds no positions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow the coordinate rows.
    #[inline]
    pub fn rows(&self) -> &[[f64; 3]] {
        &self.rows
    }
}

/// One entry of a [`DistanceSeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSample {
    /// Zero-based row position shared by both tables.
    pub index: usize,
    /// Euclidean distance in the input unit.
    pub distance: f64,
}

/// Ordered per-row distances between two position tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceSeries {
    samples: Vec<DistanceSample>,
}

impl DistanceSeries {
    /// Build a series from raw distances, indexing them from zero.
    pub fn from_distances<I: IntoIterator<Item = f64>>(distances: I) -> Self {
        let samples = distances
            .into_iter()
            .enumerate()
            .map(|(index, distance)| DistanceSample { index, distance })
            .collect();
        Self { samples }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn samples(&self) -> &[DistanceSample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistanceSample> {
        self.samples.iter()
    }

    /// Distances in the input unit, in index order.
    pub fn distances(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.distance).collect()
    }

    /// (index, distance * scale) pairs, as plotted.
    pub fn scaled_points(&self, scale: f64) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .map(|s| (s.index as f64, s.distance * scale))
            .collect()
    }

    /// Summary statistics, or `None` for an empty series.
    pub fn stats(&self) -> Option<DistanceStats> {
        if self.samples.is_empty() {
            return None;
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for s in &self.samples {
            min = min.min(s.distance);
            max = max.max(s.distance);
            sum += s.distance;
            sum_sq += s.distance * s.distance;
        }

        let n = self.samples.len() as f64;
        Some(DistanceStats {
            count: self.samples.len(),
            min,
            max,
            mean: sum / n,
            rms: (sum_sq / n).sqrt(),
        })
    }
}

/// Summary of a distance series, in the input unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub rms: f64,
}

/// Euclidean distance between two points.
#[inline]
pub fn l2_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Compute the per-row L2 distance between two position tables.
///
/// # Arguments
///
/// * `ground_truth` - Reference positions
/// * `measured` - Positions compared against the reference
/// * `policy` - Handling of unequal row counts
///
/// # Returns
///
/// One sample per common row index. With [`LengthPolicy::Truncate`] the
/// series is as long as the shorter table.
///
/// # Errors
///
/// Returns [`DistanceError::LengthMismatch`] under [`LengthPolicy::Strict`]
/// when the row counts differ.
pub fn compute_l2_distances(
    ground_truth: &PositionTable,
    measured: &PositionTable,
    policy: LengthPolicy,
) -> Result<DistanceSeries> {
    let (gt_len, measured_len) = (ground_truth.len(), measured.len());

    if gt_len != measured_len {
        match policy {
            LengthPolicy::Strict => {
                return Err(DistanceError::LengthMismatch {
                    ground_truth: gt_len,
                    measured: measured_len,
                });
            }
            LengthPolicy::Truncate => {
                warn!(
                    "Row counts differ (ground truth {}, measured {}); comparing the first {} rows",
                    gt_len,
                    measured_len,
                    gt_len.min(measured_len)
                );
            }
        }
    }

    let distances = ground_truth
        .rows()
        .iter()
        .zip(measured.rows())
        .map(|(a, b)| l2_distance(a, b));

    Ok(DistanceSeries::from_distances(distances))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
    }

    fn strings(rows: &[[&str; 3]]) -> CsvTable {
        CsvTable::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect::<Vec<String>>())
                .collect(),
        )
    }

    #[test]
    fn test_l2_distance() {
        assert_close(l2_distance(&[0.0, 0.0, 0.0], &[3.0, 4.0, 0.0]), 5.0);
        assert_close(l2_distance(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_close(l2_distance(&[1.0, 1.0, 1.0], &[0.0, 0.0, 0.0]), 3f64.sqrt());
    }

    #[test]
    fn test_two_point_scenario() {
        let a = PositionTable::from_rows(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let b = PositionTable::from_rows(vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);

        let series = compute_l2_distances(&a, &b, LengthPolicy::Truncate).unwrap();
        assert_eq!(
            series.samples(),
            &[
                DistanceSample { index: 0, distance: 0.0 },
                DistanceSample { index: 1, distance: 1.0 },
            ]
        );
        assert_eq!(series.scaled_points(1000.0), vec![(0.0, 0.0), (1.0, 1000.0)]);
    }

    #[test]
    fn test_equal_length_matches_formula() {
        let a = PositionTable::from_rows(vec![
            [0.1, 0.2, 0.3],
            [1.5, -2.0, 0.25],
            [-3.0, 4.0, 12.0],
            [0.0, 0.0, 0.0],
        ]);
        let b = PositionTable::from_rows(vec![
            [0.1, 0.25, 0.3],
            [1.0, -1.0, 0.0],
            [0.0, 0.0, 0.0],
            [-1.0, -1.0, -1.0],
        ]);

        let series = compute_l2_distances(&a, &b, LengthPolicy::Strict).unwrap();
        assert_eq!(series.len(), 4);
        for (i, sample) in series.iter().enumerate() {
            let expected = (0..3)
                .map(|k| (a.rows()[i][k] - b.rows()[i][k]).powi(2))
                .sum::<f64>()
                .sqrt();
            assert_eq!(sample.index, i);
            assert_close(sample.distance, expected);
            assert!(sample.distance >= 0.0);
        }
        assert_close(series.samples()[2].distance, 13.0);
    }

    #[test]
    fn test_identical_tables_yield_zero() {
        let a = PositionTable::from_rows(vec![[1.0, 2.0, 3.0], [-4.5, 0.0, 9.25], [7.0, 7.0, 7.0]]);
        let series = compute_l2_distances(&a, &a.clone(), LengthPolicy::Strict).unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(|s| s.distance == 0.0));
    }

    #[test]
    fn test_truncate_to_common_prefix() {
        let a = PositionTable::from_rows(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let b = PositionTable::from_rows(vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [5.0, 5.0, 5.0]]);

        let series = compute_l2_distances(&a, &b, LengthPolicy::Truncate).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.distances(), vec![0.0, 1.0]);

        // Symmetric when the ground truth is the longer table
        let series = compute_l2_distances(&b, &a, LengthPolicy::Truncate).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_strict_rejects_length_mismatch() {
        let a = PositionTable::from_rows(vec![[0.0, 0.0, 0.0]]);
        let b = PositionTable::from_rows(vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);

        match compute_l2_distances(&a, &b, LengthPolicy::Strict) {
            Err(DistanceError::LengthMismatch {
                ground_truth,
                measured,
            }) => {
                assert_eq!(ground_truth, 1);
                assert_eq!(measured, 2);
            }
            other => panic!("Expected LengthMismatch error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_table_converts_cells() {
        let table = strings(&[["0.5", "-1", "2e-3"], ["1", "2", "3"]]);
        let positions = PositionTable::from_table(&table, TableRole::GroundTruth).unwrap();
        assert_eq!(positions.rows(), &[[0.5, -1.0, 0.002], [1.0, 2.0, 3.0]]);
    }

    #[test]
    fn test_from_table_rejects_non_numeric_cell() {
        let table = strings(&[["1", "2", "3"], ["4", "five", "6"]]);
        match PositionTable::from_table(&table, TableRole::Measured) {
            Err(DistanceError::NonNumeric {
                role,
                row,
                column,
                value,
                ..
            }) => {
                assert_eq!(role, TableRole::Measured);
                assert_eq!(row, 1);
                assert_eq!(column, 1);
                assert_eq!(value, "five");
            }
            other => panic!("Expected NonNumeric error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_table_requires_three_columns() {
        let table = CsvTable::from_rows(vec![vec!["1".to_string(), "2".to_string()]]);
        let result = PositionTable::from_table(&table, TableRole::GroundTruth);
        assert!(matches!(result, Err(DistanceError::Shape(_))));
    }

    #[test]
    fn test_stats() {
        let series = DistanceSeries::from_distances([3.0, 4.0]);
        let stats = series.stats().unwrap();
        assert_eq!(stats.count, 2);
        assert_close(stats.min, 3.0);
        assert_close(stats.max, 4.0);
        assert_close(stats.mean, 3.5);
        assert_close(stats.rms, 12.5f64.sqrt());

        assert!(DistanceSeries::default().stats().is_none());
    }

    #[test]
    fn test_length_policy_serde() {
        let policy: LengthPolicy = serde_yaml::from_str("strict").unwrap();
        assert_eq!(policy, LengthPolicy::Strict);
        assert_eq!(serde_yaml::to_string(&LengthPolicy::Truncate).unwrap().trim(), "truncate");
    }
}
