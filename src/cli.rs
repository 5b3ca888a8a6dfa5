//! # CLI Module
//!
//! This module provides the command-line interface for eof-hindcast, including:
//! - Argument parsing with clap
//! - Configuration file loading (JSON/YAML)
//! - Environment variable support with the EOF_HINDCAST_ prefix
//! - Multi-source configuration merging with priority system
//! - Subcommands for evaluation, mode sweeps, input inspection and templates

use crate::error::{HindcastError, HindcastResult};
use crate::input::HindcastConfig;
use crate::split::{DateRange, parse_date_range};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Skill of EOF-based linear hindcasts of climate indices
#[derive(Parser, Debug)]
#[command(name = "eof-hindcast")]
#[command(about = "Evaluate the out-of-sample skill of EOF-based hindcasts")]
#[command(version)]
#[command(long_about = "
eof-hindcast scores a statistical hindcast of a climate index built from the
leading principal components of a precomputed decomposition A ≈ U·diag(S)·VT.

A linear map from the first p principal components to the index is fitted by
least squares on a training window and evaluated on a held-out window; the
skill is the Pearson correlation between predicted and observed values.

INPUTS:
  • U, S, VT: CSV or Parquet tables (row i of the table is row i of the matrix)
  • Target series: CSV or Parquet table with a date column and a value column

EXAMPLES:
  # Evaluate with default windows and 10 modes
  eof-hindcast evaluate --u u.parquet --s s.csv --vt vt.parquet --series index.parquet

  # Custom windows, V stored time-major
  eof-hindcast evaluate --u u.parquet --s s.csv --vt v.parquet --transpose-vt \\
    --series index.csv -p 15 --train 1979-01-01..2000-12-31 --test 2001-01-01..2020-12-31

  # Skill as a function of the number of modes
  eof-hindcast sweep --config job.yaml --max-modes 40

  # Inspect inputs
  eof-hindcast info --config job.yaml

  # Generate a configuration template
  eof-hindcast template --format yaml > job.yaml
")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress all output except errors and results
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format for results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Configuration file path (JSON or YAML)
    #[arg(short, long, global = true, env = "EOF_HINDCAST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate hindcast skill for one mode count
    #[command(long_about = "
Fit the hindcast on the training window and report the correlation skill on the
test window, together with the wall-clock time of the evaluation.

EXAMPLES:
  eof-hindcast evaluate --u u.csv --s s.csv --vt vt.csv --series index.csv -p 10

  # Save held-out predictions
  eof-hindcast evaluate --config job.json --predictions predictions.parquet

  # Machine-readable output
  eof-hindcast --output-format json evaluate --config job.yaml
")]
    Evaluate {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        window: WindowArgs,

        /// Write held-out predictions to this file (Parquet or CSV)
        #[arg(long, env = "EOF_HINDCAST_PREDICTIONS")]
        predictions: Option<String>,
    },

    /// Evaluate skill for every mode count from 1 to a maximum
    #[command(long_about = "
Evaluate the hindcast for p = 1, 2, ..., max and report one row per mode count.
The train and test windows are shared by all rows.

EXAMPLES:
  eof-hindcast sweep --config job.yaml --max-modes 30
  eof-hindcast --output-format csv sweep --config job.yaml > sweep.csv
")]
    Sweep {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        window: WindowArgs,

        /// Largest mode count (default: all available modes)
        #[arg(long, env = "EOF_HINDCAST_MAX_MODES")]
        max_modes: Option<usize>,
    },

    /// Show information about the input tables
    #[command(long_about = "
Load the decomposition and target series and display their shapes, the leading
singular values with explained-variance fractions, and the span of the time
axis, without fitting anything.

EXAMPLES:
  eof-hindcast info --u u.parquet --s s.csv --vt vt.parquet --series index.parquet
  eof-hindcast --output-format json info --config job.yaml
")]
    Info {
        #[command(flatten)]
        inputs: InputArgs,

        /// Number of leading modes to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file to validate (defaults to --config)
        config_file: Option<PathBuf>,

        /// Show the resolved configuration
        #[arg(long)]
        detailed: bool,
    },

    /// Generate a configuration template with default values
    Template {
        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration format
        #[arg(long, value_enum, default_value_t = ConfigFormat::Json)]
        format: ConfigFormat,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Input table locations
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Spatial patterns table U (n_space × k)
    #[arg(long, env = "EOF_HINDCAST_U")]
    pub u: Option<String>,

    /// Singular values table S (one column or one row)
    #[arg(long, env = "EOF_HINDCAST_S")]
    pub s: Option<String>,

    /// Temporal amplitudes table VT (k × n_time)
    #[arg(long, env = "EOF_HINDCAST_VT")]
    pub vt: Option<String>,

    /// The VT table is stored time-major (n_time × k)
    #[arg(long, env = "EOF_HINDCAST_TRANSPOSE_VT")]
    pub transpose_vt: bool,

    /// Target series table
    #[arg(long, env = "EOF_HINDCAST_SERIES")]
    pub series: Option<String>,

    /// Date column of the target series table
    #[arg(long, env = "EOF_HINDCAST_TIME_COLUMN")]
    pub time_column: Option<String>,

    /// Value column of the target series table
    #[arg(long, env = "EOF_HINDCAST_VALUE_COLUMN")]
    pub value_column: Option<String>,
}

/// Mode count and train/test windows
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Number of leading EOF modes retained
    #[arg(short = 'p', long = "modes", env = "EOF_HINDCAST_MODES")]
    pub modes: Option<usize>,

    /// Training window: YYYY-MM-DD..YYYY-MM-DD
    #[arg(long, value_parser = parse_date_range, env = "EOF_HINDCAST_TRAIN")]
    pub train: Option<DateRange>,

    /// Test window: YYYY-MM-DD..YYYY-MM-DD
    #[arg(long, value_parser = parse_date_range, env = "EOF_HINDCAST_TEST")]
    pub test: Option<DateRange>,
}

#[derive(ValueEnum, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON structured output
    Json,
    /// YAML structured output
    Yaml,
    /// CSV output
    Csv,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON configuration format
    Json,
    /// YAML configuration format
    Yaml,
}

/// Loads the configuration file if one was given, otherwise the defaults.
pub fn load_base_config(path: Option<&Path>) -> HindcastResult<HindcastConfig> {
    match path {
        Some(path) => HindcastConfig::from_file(path),
        None => Ok(HindcastConfig::default()),
    }
}

/// Applies command-line (and environment) values on top of `config`.
/// Priority: CLI arguments > environment variables > config file > defaults
pub fn merge_args(
    mut config: HindcastConfig,
    inputs: &InputArgs,
    window: Option<&WindowArgs>,
) -> HindcastConfig {
    let paths = &mut config.inputs;
    if let Some(u) = &inputs.u {
        paths.u = Some(u.clone());
    }
    if let Some(s) = &inputs.s {
        paths.s = Some(s.clone());
    }
    if let Some(vt) = &inputs.vt {
        paths.vt = Some(vt.clone());
    }
    if let Some(series) = &inputs.series {
        paths.series = Some(series.clone());
    }
    if let Some(time_column) = &inputs.time_column {
        paths.time_column = time_column.clone();
    }
    if let Some(value_column) = &inputs.value_column {
        paths.value_column = value_column.clone();
    }
    paths.transpose_vt |= inputs.transpose_vt;

    if let Some(window) = window {
        if let Some(modes) = window.modes {
            config.modes = modes;
        }
        if let Some(train) = window.train {
            config.train = train;
        }
        if let Some(test) = window.test {
            config.test = test;
        }
    }
    config
}

/// Returns a configured input path or an error naming the missing option.
pub fn require_input<'a>(value: &'a Option<String>, name: &str) -> HindcastResult<&'a str> {
    value.as_deref().ok_or_else(|| {
        HindcastError::Config(format!(
            "missing input '{}': pass --{} or set inputs.{} in the configuration file",
            name,
            name.replace('_', "-"),
            name
        ))
    })
}
