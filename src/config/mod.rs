//! Configuration types for the L2 distance pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::distance::LengthPolicy;
use crate::core::loaders::HeaderMode;

/// Locations of the two trajectories being compared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// Reference (ground truth) position CSV
    #[serde(default)]
    pub ground_truth: Option<PathBuf>,

    /// Measured position CSV compared against the ground truth
    #[serde(default)]
    pub measured: Option<PathBuf>,
}

/// Configuration for parsing the delimited input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Field delimiter (single ASCII character)
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Treatment of the first record (`first_row`, `none` or `auto`)
    #[serde(default)]
    pub header: HeaderMode,
}

fn default_delimiter() -> char {
    ','
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            header: HeaderMode::default(),
        }
    }
}

/// Configuration for the row-by-row comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// What to do when the two tables have different row counts
    #[serde(default)]
    pub length_policy: LengthPolicy,
}

/// Configuration for the distance chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Image width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Multiplier applied to distances before plotting (meters -> millimeters)
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Lower bound of the y-axis view, in scaled units
    #[serde(default)]
    pub y_min: f64,

    /// Upper bound of the y-axis view, in scaled units
    #[serde(default = "default_y_max")]
    pub y_max: f64,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_x_label")]
    pub x_label: String,

    #[serde(default = "default_y_label")]
    pub y_label: String,
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    600
}

fn default_scale() -> f64 {
    1000.0
}

fn default_y_max() -> f64 {
    200.0
}

fn default_title() -> String {
    "L2 Distance between Vectors from Two Files (Zoomed in to 200 mm)".to_string()
}

fn default_x_label() -> String {
    "Index".to_string()
}

fn default_y_label() -> String {
    "L2 Distance (mm)".to_string()
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            scale: default_scale(),
            y_min: 0.0,
            y_max: default_y_max(),
            title: default_title(),
            x_label: default_x_label(),
            y_label: default_y_label(),
        }
    }
}

/// Configuration for produced artifacts and console output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Chart image path (PNG, or SVG by extension)
    #[serde(default)]
    pub plot_path: Option<PathBuf>,

    /// Distance series CSV export path
    #[serde(default)]
    pub csv_path: Option<PathBuf>,

    /// Print the distance table to stdout
    #[serde(default = "default_print_table")]
    pub print_table: bool,

    /// Rows above which the printed table is abbreviated
    #[serde(default = "default_table_max_rows")]
    pub table_max_rows: usize,

    /// Open the interactive viewer. `None` means "only if no plot_path is set".
    #[serde(default)]
    pub show: Option<bool>,
}

fn default_print_table() -> bool {
    true
}

fn default_table_max_rows() -> usize {
    60
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            plot_path: None,
            csv_path: None,
            print_table: default_print_table(),
            table_max_rows: default_table_max_rows(),
            show: None,
        }
    }
}

impl OutputConfig {
    /// Whether the chart should be displayed interactively.
    pub fn should_show(&self) -> bool {
        self.show.unwrap_or(self.plot_path.is_none())
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub inputs: InputConfig,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub comparison: ComparisonConfig,

    #[serde(default)]
    pub plot: PlotConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    ///
    /// Relative paths inside the file are resolved against the directory
    /// containing it, so a config checked in next to its data keeps working
    /// from any working directory.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: PipelineConfig = serde_yaml::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Rewrite every relative path in the config as `base.join(path)`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        let slots = [
            &mut self.inputs.ground_truth,
            &mut self.inputs.measured,
            &mut self.output.plot_path,
            &mut self.output.csv_path,
        ];
        for slot in slots {
            if let Some(path) = slot.as_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }
}
