//! Command-line interface for the L2 distance tool.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::distance::LengthPolicy;
use crate::core::loaders::HeaderMode;
use crate::core::writers;
use crate::processors::comparison::{self, ComparisonReport};
use crate::visualization;
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "l2graph")]
#[command(about = "Per-sample L2 distance between ground truth and measured 3D positions", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Input selection shared by the comparing subcommands.
#[derive(Args)]
struct InputArgs {
    /// Ground truth position CSV (falls back to inputs.ground_truth)
    ground_truth: Option<PathBuf>,
    /// Measured position CSV (falls back to inputs.measured)
    measured: Option<PathBuf>,
    /// Field delimiter
    #[arg(short, long)]
    delimiter: Option<char>,
    /// First-record handling: first_row, none or auto
    #[arg(long)]
    header: Option<HeaderMode>,
    /// Fail if the files have different row counts instead of truncating
    #[arg(long)]
    strict: bool,
    /// Export the distance series to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

/// Chart and output options of the `plot` subcommand.
#[derive(Args)]
struct PlotArgs {
    /// Output image path (.png or .svg)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Show the chart in a window (default when no output is given)
    #[arg(long)]
    show: bool,
    /// Do not print the distance table
    #[arg(long)]
    no_table: bool,
    /// Upper limit of the y-axis view, in millimeters
    #[arg(long)]
    y_max: Option<f64>,
    /// Chart title
    #[arg(long)]
    title: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute distances and plot them (saved and/or shown)
    Plot {
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        plot: PlotArgs,
    },

    /// Compute distances and print the table and summary without plotting
    Compare {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Write the default configuration to a YAML file
    InitConfig {
        /// Destination path
        path: PathBuf,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<60} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        println!("║ {:<20}: {:<38} ║", key, fit_value(value));
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

/// Shorten a summary value to the 38 columns of the box.
fn fit_value(value: &str) -> String {
    if value.chars().count() > 38 {
        let head: String = value.chars().take(35).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    if let Err(e) = dispatch(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            let cfg = PipelineConfig::from_yaml(path)
                .map_err(|e| anyhow!("Failed to load config from {}: {}", path.display(), e))?;
            info!("Loaded config from: {}", path.display());
            cfg
        }
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Plot { inputs, plot } => {
            apply_input_args(&mut config, &inputs);
            apply_plot_args(&mut config, &plot);
            cmd_plot(&config)
        }
        Commands::Compare { inputs } => {
            apply_input_args(&mut config, &inputs);
            cmd_compare(&config)
        }
        Commands::InitConfig { path } => cmd_init_config(&path, &config),
    }
}

/// Overlay command-line input options on the loaded config.
fn apply_input_args(config: &mut PipelineConfig, args: &InputArgs) {
    if let Some(path) = &args.ground_truth {
        config.inputs.ground_truth = Some(path.clone());
    }
    if let Some(path) = &args.measured {
        config.inputs.measured = Some(path.clone());
    }
    if let Some(delimiter) = args.delimiter {
        config.loader.delimiter = delimiter;
    }
    if let Some(header) = args.header {
        config.loader.header = header;
    }
    if args.strict {
        config.comparison.length_policy = LengthPolicy::Strict;
    }
    if let Some(path) = &args.csv {
        config.output.csv_path = Some(path.clone());
    }
}

/// Overlay `plot` chart and output options on the loaded config.
fn apply_plot_args(config: &mut PipelineConfig, args: &PlotArgs) {
    if let Some(path) = &args.output {
        config.output.plot_path = Some(path.clone());
    }
    if args.show {
        config.output.show = Some(true);
    }
    if args.no_table {
        config.output.print_table = false;
    }
    if let Some(y_max) = args.y_max {
        config.plot.y_max = y_max;
    }
    if let Some(title) = &args.title {
        config.plot.title = title.clone();
    }
}

fn input_paths(config: &PipelineConfig) -> Result<(&Path, &Path)> {
    let ground_truth = config
        .inputs
        .ground_truth
        .as_deref()
        .context("No ground truth file given (argument or inputs.ground_truth)")?;
    let measured = config
        .inputs
        .measured
        .as_deref()
        .context("No measured file given (argument or inputs.measured)")?;
    Ok((ground_truth, measured))
}

/// Load, validate and compare, then print and export the series as configured.
fn run_comparison(config: &PipelineConfig) -> Result<ComparisonReport> {
    let (ground_truth, measured) = input_paths(config)?;

    println!("Ground truth: {}", ground_truth.display());
    println!("Measured:     {}", measured.display());

    let spinner = create_spinner("Computing L2 distances...");
    let result = comparison::compare_files(ground_truth, measured, &config.loader, &config.comparison);
    spinner.finish_and_clear();
    let report = result?;

    if config.output.print_table {
        writers::print_distance_table(&report.series, config.output.table_max_rows);
    }

    if let Some(csv_path) = &config.output.csv_path {
        writers::write_distance_csv(csv_path, &report.series, config.plot.scale)?;
        info!("Wrote distance CSV to {}", csv_path.display());
    }

    Ok(report)
}

fn summary_items(report: &ComparisonReport, config: &PipelineConfig) -> Vec<(&'static str, String)> {
    let scale = config.plot.scale;
    let mut items = vec![
        ("Ground truth rows", report.ground_truth_rows.to_string()),
        ("Measured rows", report.measured_rows.to_string()),
        (
            "Skipped rows",
            format!("{} / {}", report.ground_truth_skipped, report.measured_skipped),
        ),
        ("Compared rows", report.series.len().to_string()),
    ];
    if report.lengths_differ() {
        items.push((
            "Truncated",
            format!("yes, to the first {} rows", report.series.len()),
        ));
    }
    if let Some(stats) = &report.stats {
        items.push(("Mean (scaled)", format!("{:.3}", stats.mean * scale)));
        items.push(("RMS (scaled)", format!("{:.3}", stats.rms * scale)));
        items.push(("Min (scaled)", format!("{:.3}", stats.min * scale)));
        items.push(("Max (scaled)", format!("{:.3}", stats.max * scale)));
    }
    if let Some(csv_path) = &config.output.csv_path {
        items.push(("Output CSV", csv_path.display().to_string()));
    }
    items
}

fn cmd_plot(config: &PipelineConfig) -> Result<()> {
    let start = Instant::now();

    let report = run_comparison(config)?;

    if let Some(plot_path) = &config.output.plot_path {
        let spinner = create_spinner("Generating plot...");
        let result = visualization::save_distance_plot(plot_path, &report.series, &config.plot);
        spinner.finish_and_clear();
        result.with_context(|| format!("Failed to save plot to {}", plot_path.display()))?;
    }

    let mut items = summary_items(&report, config);
    if let Some(plot_path) = &config.output.plot_path {
        items.push(("Output image", plot_path.display().to_string()));
    }
    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("L2 Distance Plot Complete", &items);

    if config.output.should_show() {
        visualization::show_distance_plot(&report.series, &config.plot)
            .context("Failed to show plot")?;
    }

    Ok(())
}

fn cmd_compare(config: &PipelineConfig) -> Result<()> {
    let start = Instant::now();

    let report = run_comparison(config)?;

    let mut items = summary_items(&report, config);
    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("L2 Distance Comparison Complete", &items);

    Ok(())
}

fn cmd_init_config(path: &Path, config: &PipelineConfig) -> Result<()> {
    config
        .to_yaml(path)
        .map_err(|e| anyhow!("Failed to write config to {}: {}", path.display(), e))?;
    println!("Wrote configuration to {}", path.display());
    Ok(())
}
