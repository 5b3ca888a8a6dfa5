//! # eof-hindcast
//!
//! A Rust library for scoring EOF-based statistical hindcasts of climate
//! indices.
//!
//! Given a precomputed decomposition `A ≈ U · diag(S) · VT` of a spatiotemporal
//! field and a target index aligned with its time axis, the leading `p`
//! principal components are regressed onto the index over a training window
//! and the fitted map is scored on a held-out window by Pearson correlation.
//!
//! ## Features
//!
//! - **Date-window splits**: inclusive train/test windows on a daily axis
//! - **Stable fitting**: SVD least squares with minimum-norm solutions
//! - **Timing**: wall-clock cost of each evaluation, series preparation included
//! - **Mode sweeps**: skill as a function of the number of retained modes
//! - **Tabular inputs**: CSV and Parquet via Polars
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eof_hindcast::{run_hindcast_job, input::HindcastConfig};
//!
//! let config = HindcastConfig::from_file("hindcast.yaml")?;
//! let report = run_hindcast_job(&config)?;
//! let (skill, elapsed) = report.result.as_pair();
//! println!("skill {:.3} in {:.3} s", skill, elapsed);
//! # Ok::<(), eof_hindcast::error::HindcastError>(())
//! ```
//!
//! ## Configuration Example
//!
//! ```yaml
//! modes: 10
//! train: "1980-01-01..2010-12-31"
//! test: "2011-01-01..2022-12-31"
//! region:
//!   lat: [10.0, -10.0]
//!   lon: [90.0, 130.0]
//! inputs:
//!   u: u.parquet
//!   s: s.csv
//!   vt: vt.parquet
//!   series: slp_index.parquet
//!   value_column: msl
//! ```

pub mod cli;
pub mod decomposition;
pub mod error;
pub mod evaluator;
pub mod extract;
pub mod info;
pub mod input;
pub mod log;
pub mod output;
pub mod regression;
pub mod series;
pub mod split;


#[cfg(test)]
mod cli_tests;

use crate::cli::require_input;
use crate::decomposition::Decomposition;
use crate::error::HindcastResult;
use crate::evaluator::{HindcastSkillEvaluator, SweepRow};
use crate::extract::{TableSeriesProvider, load_decomposition};
use crate::info::{InputsInfo, decomposition_info, series_info};
use crate::input::HindcastConfig;
use crate::output::{SkillReport, write_predictions};
use crate::series::TargetSeriesProvider;

/// Loads the decomposition named by `config.inputs`.
pub fn load_configured_decomposition(config: &HindcastConfig) -> HindcastResult<Decomposition> {
    let inputs = &config.inputs;
    load_decomposition(
        require_input(&inputs.u, "u")?,
        require_input(&inputs.s, "s")?,
        require_input(&inputs.vt, "vt")?,
        inputs.transpose_vt,
    )
}

fn configured_provider(config: &HindcastConfig) -> HindcastResult<TableSeriesProvider> {
    let inputs = &config.inputs;
    let path = require_input(&inputs.series, "series")?;
    Ok(TableSeriesProvider::new(
        path,
        &inputs.time_column,
        &inputs.value_column,
    ))
}

/// Runs one hindcast evaluation as described by the configuration.
///
/// This function orchestrates the whole job:
/// 1. Validates the configuration
/// 2. Loads `U`, `S` and `VT`
/// 3. Loads the target series inside the timed window and scores the hindcast
/// 4. Writes held-out predictions if an output path is configured
///
/// # Errors
///
/// Fails if an input is missing or unreadable, if shapes disagree, if the
/// mode count is out of range, or if a window selects too few points.
pub fn run_hindcast_job(config: &HindcastConfig) -> HindcastResult<SkillReport> {
    config.validate()?;
    let decomposition = load_configured_decomposition(config)?;
    let provider = configured_provider(config)?;

    let evaluator = HindcastSkillEvaluator::from_config(config);
    let result =
        evaluator.evaluate_prepared(&decomposition, || provider.target_series(&config.region))?;

    if let Some(path) = &config.predictions {
        write_predictions(&result.fit, path)?;
    }

    Ok(SkillReport::new(
        provider.describe(),
        config.region,
        config.train,
        config.test,
        result,
    ))
}

/// Scores the hindcast for `p = 1..=max_modes` (all modes when `None`).
pub fn run_mode_sweep(
    config: &HindcastConfig,
    max_modes: Option<usize>,
    progress: bool,
) -> HindcastResult<Vec<SweepRow>> {
    config.validate()?;
    let decomposition = load_configured_decomposition(config)?;
    let series = configured_provider(config)?.target_series(&config.region)?;

    let max_modes = max_modes.unwrap_or(decomposition.n_modes());
    decomposition.check_modes(max_modes)?;
    let modes: Vec<usize> = (1..=max_modes).collect();

    HindcastSkillEvaluator::from_config(config).sweep(&decomposition, &series, &modes, progress)
}

/// Summarizes whichever inputs are configured.
pub fn inspect_inputs(config: &HindcastConfig, top: usize) -> HindcastResult<InputsInfo> {
    let inputs = &config.inputs;
    let decomposition = if inputs.u.is_some() || inputs.s.is_some() || inputs.vt.is_some() {
        Some(decomposition_info(&load_configured_decomposition(config)?, top))
    } else {
        None
    };
    let series = match TableSeriesProvider::from_inputs(inputs) {
        Some(provider) => {
            let series = provider.target_series(&config.region)?;
            Some(series_info(&series, provider.describe(), config))
        }
        None => None,
    };
    Ok(InputsInfo {
        decomposition,
        series,
    })
}
