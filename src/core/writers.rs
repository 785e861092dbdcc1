//! Console and CSV output for distance series.
//!
//! This module provides:
//! - A pandas-style text table of the series (columns "L2 Distance", "Index")
//! - CSV export of the series with both raw and scaled distances

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

use super::distance::DistanceSeries;

/// Rows shown at each end of an abbreviated table.
const EDGE_ROWS: usize = 5;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Format a distance series as a right-aligned text table.
///
/// Each line carries the row label, the distance (6 decimals) and the index.
/// Series longer than `max_rows` are abbreviated to the first and last five
/// rows with a `...` separator and a `[N rows x 2 columns]` footer.
///
/// # Example
///
/// ```
/// use l2graph::core::distance::DistanceSeries;
/// use l2graph::core::writers::format_distance_table;
///
/// let series = DistanceSeries::from_distances([0.0, 1.0]);
/// let table = format_distance_table(&series, 60);
/// assert!(table.lines().next().unwrap().contains("L2 Distance  Index"));
/// ```
pub fn format_distance_table(series: &DistanceSeries, max_rows: usize) -> String {
    let samples = series.samples();
    let truncated = samples.len() > max_rows.max(2 * EDGE_ROWS);

    let visible: Vec<Option<(String, String, String)>> = if truncated {
        let head = samples[..EDGE_ROWS].iter().map(Some);
        let tail = samples[samples.len() - EDGE_ROWS..].iter().map(Some);
        head.chain(std::iter::once(None))
            .chain(tail)
            .map(|s| s.map(|s| (s.index.to_string(), format!("{:.6}", s.distance), s.index.to_string())))
            .collect()
    } else {
        samples
            .iter()
            .map(|s| Some((s.index.to_string(), format!("{:.6}", s.distance), s.index.to_string())))
            .collect()
    };

    let label_width = visible
        .iter()
        .flatten()
        .map(|(label, _, _)| label.len())
        .max()
        .unwrap_or(0)
        .max(if truncated { 2 } else { 0 });
    let distance_width = visible
        .iter()
        .flatten()
        .map(|(_, d, _)| d.len())
        .max()
        .unwrap_or(0)
        .max("L2 Distance".len());
    let index_width = visible
        .iter()
        .flatten()
        .map(|(_, _, i)| i.len())
        .max()
        .unwrap_or(0)
        .max("Index".len());

    let mut out = format!(
        "{:<lw$}  {:>dw$}  {:>iw$}\n",
        "",
        "L2 Distance",
        "Index",
        lw = label_width,
        dw = distance_width,
        iw = index_width
    );

    for row in &visible {
        let line = match row {
            Some((label, distance, index)) => format!(
                "{:<lw$}  {:>dw$}  {:>iw$}\n",
                label,
                distance,
                index,
                lw = label_width,
                dw = distance_width,
                iw = index_width
            ),
            None => format!(
                "{:<lw$}  {:>dw$}  {:>iw$}\n",
                "..",
                "...",
                "...",
                lw = label_width,
                dw = distance_width,
                iw = index_width
            ),
        };
        out.push_str(&line);
    }

    if truncated {
        out.push_str(&format!("\n[{} rows x 2 columns]\n", samples.len()));
    }

    out
}

/// Print a distance series table to standard output.
pub fn print_distance_table(series: &DistanceSeries, max_rows: usize) {
    print!("{}", format_distance_table(series, max_rows));
}

/// Write a distance series to CSV.
///
/// Creates a CSV file with headers "index,l2_distance,l2_distance_scaled"
/// and one row per sample. `scale` is the display multiplier (1000 turns
/// meters into millimeters).
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `series` - Distances to export
/// * `scale` - Multiplier for the scaled column
///
/// # Errors
///
/// Returns an error if:
/// - Parent directories cannot be created
/// - File cannot be created or written to
pub fn write_distance_csv(path: &Path, series: &DistanceSeries, scale: f64) -> Result<()> {
    ensure_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    let buf_writer = BufWriter::new(file);
    let mut csv_writer = csv::Writer::from_writer(buf_writer);

    let path_str = path.display().to_string();

    // Write header
    csv_writer
        .write_record(["index", "l2_distance", "l2_distance_scaled"])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    // Write data rows
    for sample in series.iter() {
        csv_writer
            .write_record(&[
                sample.index.to_string(),
                format!("{:.9}", sample.distance),
                format!("{:.6}", sample.distance * scale),
            ])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_short_table() {
        let series = DistanceSeries::from_distances([0.0, 1.0]);
        let table = format_distance_table(&series, 60);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "   L2 Distance  Index");
        assert_eq!(lines[1], "0     0.000000      0");
        assert_eq!(lines[2], "1     1.000000      1");
    }

    #[test]
    fn test_format_truncated_table() {
        let series = DistanceSeries::from_distances((0..100).map(|i| i as f64 * 0.001));
        let table = format_distance_table(&series, 60);
        let lines: Vec<&str> = table.lines().collect();

        // header + 5 head + separator + 5 tail + blank + footer
        assert_eq!(lines.len(), 14);
        assert!(lines[1].starts_with("0 "));
        assert!(lines[6].starts_with(".."));
        assert!(lines[6].contains("..."));
        assert!(lines[7].starts_with("95"));
        assert!(lines[11].starts_with("99"));
        assert!(lines[11].contains("0.099000"));
        assert_eq!(lines[13], "[100 rows x 2 columns]");
    }

    #[test]
    fn test_format_at_limit_is_not_truncated() {
        let series = DistanceSeries::from_distances(vec![0.5; 60]);
        let table = format_distance_table(&series, 60);
        assert_eq!(table.lines().count(), 61);
        assert!(!table.contains("rows x"));
    }

    #[test]
    fn test_format_empty_table() {
        let table = format_distance_table(&DistanceSeries::default(), 60);
        assert_eq!(table.lines().count(), 1);
        assert!(table.contains("L2 Distance  Index"));
    }

    #[test]
    fn test_write_distance_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("l2_distances.csv");
        let series = DistanceSeries::from_distances([0.0, 0.0125]);

        write_distance_csv(&path, &series, 1000.0).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "index,l2_distance,l2_distance_scaled");
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert_eq!(lines[1], "0,0.000000000,0.000000");
        assert_eq!(lines[2], "1,0.012500000,12.500000");
    }
}
