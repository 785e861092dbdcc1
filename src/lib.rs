//! Per-sample L2 distance between two 3D trajectories.
//!
//! This crate provides tools for:
//! - Loading ground truth and measured position CSV files
//! - Validating that both tables hold exactly three coordinate columns
//! - Computing the row-wise Euclidean distance between the two trajectories
//! - Plotting the distance series in millimeters, saved to file or shown in a window
//!
//! # Example
//!
//! ```no_run
//! use l2graph::config::{ComparisonConfig, LoaderConfig, PlotConfig};
//! use l2graph::processors::comparison::compare_files;
//! use l2graph::visualization::save_distance_plot;
//! use std::path::Path;
//!
//! let report = compare_files(
//!     Path::new("ball_pos_gt.csv"),
//!     Path::new("ball_pos_real.csv"),
//!     &LoaderConfig::default(),
//!     &ComparisonConfig::default(),
//! )
//! .unwrap();
//! save_distance_plot(Path::new("l2_distance.png"), &report.series, &PlotConfig::default()).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{ComparisonConfig, InputConfig, LoaderConfig, OutputConfig, PipelineConfig, PlotConfig};
pub use core::distance::{DistanceSeries, LengthPolicy};
pub use core::loaders::{CsvTable, HeaderMode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
