//! Ground truth vs. measured trajectory comparison.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::config::{ComparisonConfig, LoaderConfig};
use crate::core::distance::{compute_l2_distances, DistanceSeries, DistanceStats, PositionTable};
use crate::core::loaders::{load_table, CsvTable, TableRole};
use crate::core::validation::validate_pair;

/// Everything produced by one comparison run.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub series: DistanceSeries,
    /// `None` only when the tables share no rows.
    pub stats: Option<DistanceStats>,
    pub ground_truth_rows: usize,
    pub measured_rows: usize,
    pub ground_truth_skipped: usize,
    pub measured_skipped: usize,
}

impl ComparisonReport {
    /// True if the two tables had different row counts.
    pub fn lengths_differ(&self) -> bool {
        self.ground_truth_rows != self.measured_rows
    }
}

/// Load, validate and compare two position files.
///
/// Runs the full pipeline: both files are loaded, checked for exactly three
/// columns, converted to numbers and compared row by row.
///
/// # Arguments
///
/// * `ground_truth` - Path to the reference position CSV
/// * `measured` - Path to the measured position CSV
/// * `loader` - Delimiter settings for both files
/// * `comparison` - Row count policy
///
/// # Returns
///
/// A [`ComparisonReport`] with the distance series and its statistics.
pub fn compare_files(
    ground_truth: &Path,
    measured: &Path,
    loader: &LoaderConfig,
    comparison: &ComparisonConfig,
) -> Result<ComparisonReport> {
    let gt_table = load_table(ground_truth, Some(loader))
        .with_context(|| format!("Failed to load ground truth: {}", ground_truth.display()))?;
    let measured_table = load_table(measured, Some(loader))
        .with_context(|| format!("Failed to load measured positions: {}", measured.display()))?;

    compare_tables(&gt_table, &measured_table, comparison)
}

/// Validate and compare two already-loaded tables.
pub fn compare_tables(
    ground_truth: &CsvTable,
    measured: &CsvTable,
    comparison: &ComparisonConfig,
) -> Result<ComparisonReport> {
    validate_pair(ground_truth, measured)?;

    let gt_positions = PositionTable::from_table(ground_truth, TableRole::GroundTruth)?;
    let measured_positions = PositionTable::from_table(measured, TableRole::Measured)?;

    let series = compute_l2_distances(&gt_positions, &measured_positions, comparison.length_policy)?;
    let stats = series.stats();

    if let Some(stats) = &stats {
        info!(
            "Compared {} rows: mean {:.6}, rms {:.6}, max {:.6}",
            stats.count, stats.mean, stats.rms, stats.max
        );
    }

    Ok(ComparisonReport {
        series,
        stats,
        ground_truth_rows: gt_positions.len(),
        measured_rows: measured_positions.len(),
        ground_truth_skipped: ground_truth.skipped_rows,
        measured_skipped: measured.skipped_rows,
    })
}
