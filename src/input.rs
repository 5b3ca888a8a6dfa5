//! # Input Configuration Module
//!
//! This module provides configuration parsing and validation for hindcast jobs.
//! A job names the retained-mode count, the train and test windows, the region
//! the target index was averaged over, and optionally the input tables.
//!
//! ## Configuration Structure
//!
//! - **modes**: number of leading EOF modes retained (default 10)
//! - **train**: inclusive training window (default `1980-01-01..2010-12-31`)
//! - **test**: inclusive held-out window (default `2011-01-01..2022-12-31`)
//! - **region**: latitude/longitude box of the target index
//! - **inputs**: paths to the `U`, `S`, `VT` and target-series tables
//! - **predictions**: optional path for the held-out predictions table
//!
//! Every field has a default, so an empty document is a valid configuration.
//!
//! ## Example Usage
//!
//! ```rust
//! use eof_hindcast::input::HindcastConfig;
//!
//! let yaml = r#"
//! modes: 12
//! train: "1981-01-01..2005-12-31"
//! region:
//!   lat: [5.0, -5.0]
//!   lon: [190.0, 240.0]
//! "#;
//! let config = HindcastConfig::from_yaml(yaml)?;
//! assert_eq!(config.modes, 12);
//! assert_eq!(config.test.to_string(), "2011-01-01..2022-12-31");
//! # Ok::<(), eof_hindcast::error::HindcastError>(())
//! ```

use crate::error::{HindcastError, HindcastResult};
use crate::split::{DateRange, date};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default number of retained modes
pub const DEFAULT_MODES: usize = 10;

/// Default training window
pub const DEFAULT_TRAIN: DateRange = DateRange::fixed(date(1980, 1, 1), date(2010, 12, 31));

/// Default held-out window
pub const DEFAULT_TEST: DateRange = DateRange::fixed(date(2011, 1, 1), date(2022, 12, 31));

/// Main configuration structure for hindcast jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HindcastConfig {
    /// Number of leading EOF modes retained
    #[serde(default = "default_modes")]
    pub modes: usize,
    /// Inclusive training window
    #[serde(default = "default_train")]
    pub train: DateRange,
    /// Inclusive held-out window
    #[serde(default = "default_test")]
    pub test: DateRange,
    /// Region the target index is averaged over
    #[serde(default)]
    pub region: Region,
    /// Input tables
    #[serde(default)]
    pub inputs: InputPaths,
    /// Optional output path for held-out predictions (Parquet or CSV)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<String>,
}

/// Latitude/longitude box, bounds in the order the source grid stores them
///
/// The default box (`lat 10..-10`, `lon 90..130`) follows a grid with
/// descending latitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// `(first, last)` latitude in degrees
    pub lat: (f64, f64),
    /// `(first, last)` longitude in degrees
    pub lon: (f64, f64),
}

/// Locations of the decomposition and target-series tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputPaths {
    /// Spatial patterns, `n_space × k`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub u: Option<String>,
    /// Singular values, one column or one row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
    /// Temporal amplitudes, `k × n_time` (or `n_time × k` with `transpose_vt`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vt: Option<String>,
    /// Target series table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    /// The `vt` table is stored time-major (`V` layout)
    #[serde(default)]
    pub transpose_vt: bool,
    /// Name of the date column in the series table
    #[serde(default = "default_time_column")]
    pub time_column: String,
    /// Name of the value column in the series table
    #[serde(default = "default_value_column")]
    pub value_column: String,
}

fn default_modes() -> usize {
    DEFAULT_MODES
}

fn default_train() -> DateRange {
    DEFAULT_TRAIN
}

fn default_test() -> DateRange {
    DEFAULT_TEST
}

fn default_time_column() -> String {
    "time".to_string()
}

fn default_value_column() -> String {
    "value".to_string()
}

impl Default for HindcastConfig {
    fn default() -> Self {
        Self {
            modes: DEFAULT_MODES,
            train: DEFAULT_TRAIN,
            test: DEFAULT_TEST,
            region: Region::default(),
            inputs: InputPaths::default(),
            predictions: None,
        }
    }
}

impl Default for Region {
    fn default() -> Self {
        Self {
            lat: (10.0, -10.0),
            lon: (90.0, 130.0),
        }
    }
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            u: None,
            s: None,
            vt: None,
            series: None,
            transpose_vt: false,
            time_column: default_time_column(),
            value_column: default_value_column(),
        }
    }
}

impl Region {
    pub fn validate(&self) -> HindcastResult<()> {
        for lat in [self.lat.0, self.lat.1] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(HindcastError::invalid(
                    "region.lat",
                    lat,
                    "latitude must be within [-90, 90]",
                ));
            }
        }
        for lon in [self.lon.0, self.lon.1] {
            if !(-180.0..=360.0).contains(&lon) {
                return Err(HindcastError::invalid(
                    "region.lon",
                    lon,
                    "longitude must be within [-180, 360]",
                ));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lat {}..{}, lon {}..{}",
            self.lat.0, self.lat.1, self.lon.0, self.lon.1
        )
    }
}

impl HindcastConfig {
    /// Loads a job configuration from a JSON or YAML file.
    ///
    /// Files ending in `.yaml` or `.yml` are parsed as YAML, everything else
    /// as JSON.
    ///
    /// ```rust,no_run
    /// use eof_hindcast::input::HindcastConfig;
    ///
    /// let config = HindcastConfig::from_file("hindcast.yaml")?;
    /// println!("Retaining {} modes", config.modes);
    /// # Ok::<(), eof_hindcast::error::HindcastError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> HindcastResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        if is_yaml_path(path) {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    pub fn from_json(json_str: &str) -> HindcastResult<Self> {
        let config: HindcastConfig = serde_json::from_str(json_str)?;
        Ok(config)
    }

    pub fn from_yaml(yaml_str: &str) -> HindcastResult<Self> {
        let config: HindcastConfig = serde_yaml::from_str(yaml_str)?;
        Ok(config)
    }

    pub fn to_json(&self) -> HindcastResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> HindcastResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks parameter ranges that do not depend on the input data.
    ///
    /// The upper bound on `modes` is only known once the decomposition is
    /// loaded and is checked by the evaluator.
    pub fn validate(&self) -> HindcastResult<()> {
        if self.modes < 1 {
            return Err(HindcastError::invalid(
                "modes",
                self.modes,
                "at least one mode must be retained",
            ));
        }
        self.region.validate()?;
        if self.train.overlaps(&self.test) {
            warn!(
                "Train window {} overlaps test window {}; skill is partly in-sample",
                self.train, self.test
            );
        }
        Ok(())
    }
}

fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
