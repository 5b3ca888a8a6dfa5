//! # Input Information Module
//!
//! This module summarizes the hindcast inputs without fitting anything: the
//! decomposition shapes, leading singular values with their share of the total
//! variance, and the span of the target series.

use crate::decomposition::Decomposition;
use crate::input::HindcastConfig;
use crate::series::TargetSeries;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One retained mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModeInfo {
    pub index: usize,
    pub singular_value: f64,
    /// `s_i² / Σ s_j²`
    pub variance_fraction: f64,
    /// Running sum of `variance_fraction`
    pub cumulative_fraction: f64,
}

/// Summary of a decomposition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecompositionInfo {
    pub n_space: usize,
    pub n_modes: usize,
    pub n_time: usize,
    pub leading_modes: Vec<ModeInfo>,
}

/// Summary of a target series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesInfo {
    pub source: String,
    pub length: usize,
    pub first: Option<String>,
    pub last: Option<String>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    /// Steps inside the configured train window
    pub n_train: usize,
    /// Steps inside the configured test window
    pub n_test: usize,
}

/// Complete information about the configured inputs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputsInfo {
    pub decomposition: Option<DecompositionInfo>,
    pub series: Option<SeriesInfo>,
}

pub fn decomposition_info(decomposition: &Decomposition, top: usize) -> DecompositionInfo {
    let s = decomposition.singular_values();
    let total: f64 = s.iter().map(|v| v * v).sum();
    let mut cumulative = 0.0;
    let leading_modes = s
        .iter()
        .take(top)
        .enumerate()
        .map(|(index, &sigma)| {
            let fraction = if total > 0.0 { sigma * sigma / total } else { 0.0 };
            cumulative += fraction;
            ModeInfo {
                index,
                singular_value: sigma,
                variance_fraction: fraction,
                cumulative_fraction: cumulative,
            }
        })
        .collect();

    DecompositionInfo {
        n_space: decomposition.n_space(),
        n_modes: decomposition.n_modes(),
        n_time: decomposition.n_time(),
        leading_modes,
    }
}

pub fn series_info(series: &TargetSeries, source: String, config: &HindcastConfig) -> SeriesInfo {
    let values = series.values();
    let n = values.len();
    let (mean, std_dev) = if n > 0 {
        let mean = values.iter().sum::<f64>() / n as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        (Some(mean), Some(var.sqrt()))
    } else {
        (None, None)
    };
    let span = series.span();

    SeriesInfo {
        source,
        length: n,
        first: span.map(|(first, _)| first.to_string()),
        last: span.map(|(_, last)| last.to_string()),
        mean,
        std_dev,
        n_train: config.train.indices(series.times()).len(),
        n_test: config.test.indices(series.times()).len(),
    }
}

/// Print input info in human-readable format
pub fn print_inputs_info_human(info: &InputsInfo) {
    if let Some(dec) = &info.decomposition {
        println!("Decomposition:");
        println!("  U: {} x {}", dec.n_space, dec.n_modes);
        println!("  S: {}", dec.n_modes);
        println!("  VT: {} x {}", dec.n_modes, dec.n_time);
        println!("  Leading modes:");
        for mode in &dec.leading_modes {
            println!(
                "    #{:<3} s = {:<12.6e} {:>6.2}% (cumulative {:>6.2}%)",
                mode.index + 1,
                mode.singular_value,
                mode.variance_fraction * 100.0,
                mode.cumulative_fraction * 100.0
            );
        }
    }
    if let Some(series) = &info.series {
        println!("Target series: {}", series.source);
        println!("  Length: {}", series.length);
        if let (Some(first), Some(last)) = (&series.first, &series.last) {
            println!("  Span: {} .. {}", first, last);
        }
        if let (Some(mean), Some(std_dev)) = (series.mean, series.std_dev) {
            println!("  Mean: {:.6}, std: {:.6}", mean, std_dev);
        }
        println!("  Steps in train window: {}", series.n_train);
        println!("  Steps in test window: {}", series.n_test);
    }
    if info.decomposition.is_none() && info.series.is_none() {
        println!("No inputs configured");
    }
}

/// Print input info in JSON format
pub fn print_inputs_info_json(info: &InputsInfo) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(info)?);
    Ok(())
}

/// Print input info in YAML format
pub fn print_inputs_info_yaml(info: &InputsInfo) -> Result<()> {
    println!("{}", serde_yaml::to_string(info)?);
    Ok(())
}

/// Print input info in CSV format (leading modes only)
pub fn print_inputs_info_csv(info: &InputsInfo) -> Result<()> {
    println!("mode,singular_value,variance_fraction,cumulative_fraction");
    if let Some(dec) = &info.decomposition {
        for mode in &dec.leading_modes {
            println!(
                "{},{},{},{}",
                mode.index + 1,
                mode.singular_value,
                mode.variance_fraction,
                mode.cumulative_fraction
            );
        }
    }
    Ok(())
}
