//! # Target Series
//!
//! The scalar index a hindcast tries to reproduce (for example a regionally
//! averaged pressure anomaly), together with its daily time axis. How the
//! series is produced is up to a [`TargetSeriesProvider`]; the evaluator only
//! needs it aligned index-for-index with the decomposition's time axis.

use crate::error::{HindcastError, HindcastResult};
use crate::input::Region;
use chrono::NaiveDate;

/// Time-indexed scalar series
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSeries {
    times: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TargetSeries {
    pub fn new(times: Vec<NaiveDate>, values: Vec<f64>) -> HindcastResult<Self> {
        if times.len() != values.len() {
            return Err(HindcastError::mismatch(
                "target series values vs time axis",
                times.len(),
                values.len(),
            ));
        }
        Ok(Self { times, values })
    }

    pub fn times(&self) -> &[NaiveDate] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First and last date of the axis, if any
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.times.iter().min()?;
        let last = self.times.iter().max()?;
        Some((*first, *last))
    }
}

/// Source of a target series for a given spatial region
///
/// Implementations decide how the region is used. The table-backed provider
/// reads an index that was already averaged over the region upstream.
pub trait TargetSeriesProvider {
    /// Produce the series to be hindcast
    fn target_series(&self, region: &Region) -> HindcastResult<TargetSeries>;

    /// Short human-readable description of the source
    fn describe(&self) -> String;
}

/// Provider wrapping a series that is already in memory
#[derive(Debug, Clone)]
pub struct InMemorySeriesProvider {
    series: TargetSeries,
}

impl InMemorySeriesProvider {
    pub fn new(series: TargetSeries) -> Self {
        Self { series }
    }
}

impl TargetSeriesProvider for InMemorySeriesProvider {
    fn target_series(&self, _region: &Region) -> HindcastResult<TargetSeries> {
        Ok(self.series.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory series ({} steps)", self.series.len())
    }
}
