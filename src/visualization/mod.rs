//! Line chart of a distance series.
//!
//! The chart plots index against scaled distance with a fixed y view.
//! Values outside the view stay in the series; their line segments are cut
//! at the view boundary before drawing. Charts can be written to PNG/SVG or
//! shown in a window (feature `viewer`).

mod backend;

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::PlotConfig;
use crate::core::distance::DistanceSeries;

use backend::FontSafeBackend;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Empty distance series")]
    EmptySeries,

    #[error("Output directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("Invalid y range: {min}..{max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("Interactive viewer not available (built without the `viewer` feature)")]
    ViewerUnavailable,

    #[error("Viewer error: {0}")]
    Viewer(String),
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Line color for the distance curve.
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Major and minor grid colors.
const GRID_BOLD: RGBColor = RGBColor(200, 200, 200);
const GRID_LIGHT: RGBColor = RGBColor(235, 235, 235);

/// Image encodings selected by output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Raster image; the encoder is picked from the extension (PNG by default).
    Bitmap,
    Svg,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => ImageFormat::Svg,
            _ => ImageFormat::Bitmap,
        }
    }
}

/// Cut a polyline to the horizontal band `y_min..=y_max`.
///
/// Returns the visible runs in order. A segment crossing the band edge is
/// split at the crossing, so a run can start or end on the boundary.
/// Segments with a NaN endpoint are dropped.
///
/// # Example
///
/// ```
/// use l2graph::visualization::clip_to_band;
///
/// let runs = clip_to_band(&[(0.0, 0.0), (1.0, 1000.0)], 0.0, 200.0);
/// assert_eq!(runs, vec![vec![(0.0, 0.0), (0.2, 200.0)]]);
/// ```
pub fn clip_to_band(points: &[(f64, f64)], y_min: f64, y_max: f64) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();

    if let [(x, y)] = points {
        if (y_min..=y_max).contains(y) {
            runs.push(vec![(*x, *y)]);
        }
        return runs;
    }

    let mut current: Vec<(f64, f64)> = Vec::new();
    for pair in points.windows(2) {
        match clip_segment(pair[0], pair[1], y_min, y_max) {
            Some((start, end)) => {
                if current.last() != Some(&start) {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                    current.push(start);
                }
                current.push(end);
            }
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// Visible part of segment `a -> b` within the band, if any.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    y_min: f64,
    y_max: f64,
) -> Option<((f64, f64), (f64, f64))> {
    if a.1.is_nan() || b.1.is_nan() {
        return None;
    }

    let dy = b.1 - a.1;
    if dy == 0.0 {
        return (y_min..=y_max).contains(&a.1).then_some((a, b));
    }

    let t_lo = (y_min - a.1) / dy;
    let t_hi = (y_max - a.1) / dy;
    let t_enter = t_lo.min(t_hi).max(0.0);
    let t_exit = t_lo.max(t_hi).min(1.0);
    if t_enter > t_exit {
        return None;
    }

    Some((lerp(a, b, t_enter), lerp(a, b, t_exit)))
}

/// Interpolate along `a -> b`, returning the endpoints exactly at t = 0 and t = 1.
fn lerp(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1))
    }
}

fn check_inputs(series: &DistanceSeries, config: &PlotConfig) -> Result<()> {
    if series.is_empty() {
        return Err(VisualizationError::EmptySeries);
    }
    if config.y_min.partial_cmp(&config.y_max) != Some(Ordering::Less) {
        return Err(VisualizationError::InvalidRange {
            min: config.y_min,
            max: config.y_max,
        });
    }
    Ok(())
}

/// Draw the distance chart onto a drawing area and present it.
fn draw_distance_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &DistanceSeries,
    config: &PlotConfig,
) -> Result<()> {
    root.fill(&WHITE)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let x_max = series.len().saturating_sub(1).max(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(&config.title, ("sans-serif", 22))
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, config.y_min..config.y_max)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(config.x_label.as_str())
        .y_desc(config.y_label.as_str())
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .bold_line_style(GRID_BOLD.stroke_width(1))
        .light_line_style(GRID_LIGHT.stroke_width(1))
        .draw()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let points = series.scaled_points(config.scale);
    for run in clip_to_band(&points, config.y_min, config.y_max) {
        chart
            .draw_series(LineSeries::new(run, LINE_COLOR.stroke_width(2)))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    root.present()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Plot a distance series and save it as an image.
///
/// # Arguments
///
/// * `output_path` - Image path; `.svg` writes SVG, anything else a bitmap
/// * `series` - Distances to plot
/// * `config` - Chart size, scale, y view and labels
///
/// # Errors
///
/// Returns an error if the series is empty, the y range is inverted, the
/// parent directory of `output_path` does not exist, or drawing fails.
pub fn save_distance_plot(
    output_path: &Path,
    series: &DistanceSeries,
    config: &PlotConfig,
) -> Result<()> {
    check_inputs(series, config)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(VisualizationError::MissingDirectory(parent.to_path_buf()));
        }
    }

    let size = (config.width, config.height);
    match ImageFormat::from_path(output_path) {
        ImageFormat::Bitmap => {
            let root = FontSafeBackend::new(BitMapBackend::new(output_path, size)).into_drawing_area();
            draw_distance_chart(&root, series, config)?;
        }
        ImageFormat::Svg => {
            let root = FontSafeBackend::new(SVGBackend::new(output_path, size)).into_drawing_area();
            draw_distance_chart(&root, series, config)?;
        }
    }

    info!("Saved distance plot to {}", output_path.display());
    Ok(())
}

/// Render the chart into a packed RGB buffer of `width * height * 3` bytes.
pub fn render_rgb(series: &DistanceSeries, config: &PlotConfig) -> Result<Vec<u8>> {
    check_inputs(series, config)?;

    let mut buffer = vec![0u8; config.width as usize * config.height as usize * 3];
    {
        let backend = BitMapBackend::with_buffer(&mut buffer, (config.width, config.height));
        let root = FontSafeBackend::new(backend).into_drawing_area();
        draw_distance_chart(&root, series, config)?;
    }
    Ok(buffer)
}

/// Show the chart in a window, blocking until it is closed or Escape is pressed.
#[cfg(feature = "viewer")]
pub fn show_distance_plot(series: &DistanceSeries, config: &PlotConfig) -> Result<()> {
    use minifb::{Key, Window, WindowOptions};

    let rgb = render_rgb(series, config)?;
    let buffer = rgb_to_argb(&rgb);
    let (width, height) = (config.width as usize, config.height as usize);

    let mut window = Window::new(&config.title, width, height, WindowOptions::default())
        .map_err(|e| VisualizationError::Viewer(e.to_string()))?;
    window.set_target_fps(30);

    info!("Showing distance plot (close the window or press Esc to continue)");
    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&buffer, width, height)
            .map_err(|e| VisualizationError::Viewer(e.to_string()))?;
    }

    Ok(())
}

/// Show the chart in a window (unavailable in this build).
#[cfg(not(feature = "viewer"))]
pub fn show_distance_plot(_series: &DistanceSeries, _config: &PlotConfig) -> Result<()> {
    Err(VisualizationError::ViewerUnavailable)
}

/// Pack RGB triples into ARGB words for a framebuffer window.
pub fn rgb_to_argb(rgb: &[u8]) -> Vec<u32> {
    rgb.chunks_exact(3)
        .map(|px| (0xFFu32 << 24) | ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32)
        .collect()
}
