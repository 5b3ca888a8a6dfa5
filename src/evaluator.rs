//! # Hindcast Skill Evaluator
//!
//! Scores a linear hindcast of a scalar index built from the leading
//! principal components of a decomposition:
//!
//! 1. `PCs = diag(S[:p]) · VT[:p, :]`
//! 2. select train and test time steps with inclusive date windows
//! 3. fit `y ≈ X β` by least squares on the training steps
//! 4. predict the test steps and correlate with the observed values
//!
//! Every call recomputes everything from its inputs; nothing is cached.
//!
//! ```rust
//! use eof_hindcast::decomposition::Decomposition;
//! use eof_hindcast::evaluator::HindcastSkillEvaluator;
//! use eof_hindcast::split::DateRange;
//! use chrono::{Duration, NaiveDate};
//! use nalgebra::{DMatrix, DVector};
//!
//! let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
//! let times: Vec<NaiveDate> = (0..8).map(|i| start + Duration::days(i)).collect();
//! let target: Vec<f64> = (0..8).map(|i| ((i * i) % 5) as f64).collect();
//!
//! let vt = DMatrix::from_row_slice(1, 8, &target);
//! let decomposition = Decomposition::new(DMatrix::from_element(1, 1, 1.0), DVector::from_element(1, 1.0), vt)?;
//!
//! let evaluator = HindcastSkillEvaluator::new(
//!     1,
//!     "2000-01-01..2000-01-04".parse()?,
//!     "2000-01-05..2000-01-08".parse()?,
//! );
//! let skill = evaluator.evaluate(&decomposition, &times, &target)?;
//! assert!((skill.skill() - 1.0).abs() < 1e-9);
//! # Ok::<(), eof_hindcast::error::HindcastError>(())
//! ```

use crate::decomposition::Decomposition;
use crate::error::{HindcastError, HindcastResult};
use crate::input::HindcastConfig;
use crate::regression::{pearson, rmse, solve_least_squares};
use crate::series::TargetSeries;
use crate::split::DateRange;
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Outcome of one hindcast fit, without timing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HindcastFit {
    /// Pearson correlation between observed and predicted test values
    pub skill: f64,
    /// Regression coefficients, one per retained mode
    pub beta: Vec<f64>,
    /// Number of retained modes
    pub modes: usize,
    /// Numerical rank of the training design matrix
    pub rank: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Correlation of the fitted values on the training steps
    pub train_skill: Option<f64>,
    /// Root mean square error on the test steps
    pub test_rmse: f64,
    #[serde(skip)]
    pub test_times: Vec<NaiveDate>,
    #[serde(skip)]
    pub observed: Vec<f64>,
    #[serde(skip)]
    pub predicted: Vec<f64>,
}

/// A fit together with the wall-clock time it took
#[derive(Debug, Clone, Serialize)]
pub struct HindcastSkill {
    #[serde(flatten)]
    pub fit: HindcastFit,
    #[serde(rename = "elapsed_seconds", serialize_with = "serialize_seconds")]
    pub elapsed: Duration,
}

fn serialize_seconds<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl HindcastSkill {
    pub fn skill(&self) -> f64 {
        self.fit.skill
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// `(skill, elapsed_seconds)`
    pub fn as_pair(&self) -> (f64, f64) {
        (self.skill(), self.elapsed_seconds())
    }
}

/// One row of a mode sweep
#[derive(Debug, Clone, Serialize)]
pub struct SweepRow {
    pub modes: usize,
    pub skill: f64,
    pub train_skill: Option<f64>,
    pub test_rmse: f64,
    pub rank: usize,
}

/// Evaluates hindcast skill for a fixed mode count and train/test windows
#[derive(Debug, Clone, PartialEq)]
pub struct HindcastSkillEvaluator {
    modes: usize,
    train: DateRange,
    test: DateRange,
}

impl HindcastSkillEvaluator {
    pub fn new(modes: usize, train: DateRange, test: DateRange) -> Self {
        Self { modes, train, test }
    }

    pub fn from_config(config: &HindcastConfig) -> Self {
        Self::new(config.modes, config.train, config.test)
    }

    pub fn modes(&self) -> usize {
        self.modes
    }

    pub fn train(&self) -> DateRange {
        self.train
    }

    pub fn test(&self) -> DateRange {
        self.test
    }

    /// Same windows with a different mode count
    pub fn with_modes(&self, modes: usize) -> Self {
        Self { modes, ..self.clone() }
    }

    /// Fits and scores the hindcast, timing the computation.
    pub fn evaluate(
        &self,
        decomposition: &Decomposition,
        times: &[NaiveDate],
        target: &[f64],
    ) -> HindcastResult<HindcastSkill> {
        let tic = Instant::now();
        let fit = eof_hindcast(decomposition, times, target, self.modes, &self.train, &self.test)?;
        let elapsed = tic.elapsed();
        debug!("Hindcast with {} modes took {:?}", self.modes, elapsed);
        Ok(HindcastSkill { fit, elapsed })
    }

    /// Like [`evaluate`](Self::evaluate), but the target series is produced by
    /// `prepare` inside the timed window.
    pub fn evaluate_prepared<F>(
        &self,
        decomposition: &Decomposition,
        prepare: F,
    ) -> HindcastResult<HindcastSkill>
    where
        F: FnOnce() -> HindcastResult<TargetSeries>,
    {
        let tic = Instant::now();
        let series = prepare()?;
        let fit = eof_hindcast(
            decomposition,
            series.times(),
            series.values(),
            self.modes,
            &self.train,
            &self.test,
        )?;
        let elapsed = tic.elapsed();
        debug!(
            "Hindcast with {} modes (including series preparation) took {:?}",
            self.modes, elapsed
        );
        Ok(HindcastSkill { fit, elapsed })
    }

    /// Scores every mode count in `modes`, stopping at the first failure.
    pub fn sweep(
        &self,
        decomposition: &Decomposition,
        series: &TargetSeries,
        modes: &[usize],
        progress: bool,
    ) -> HindcastResult<Vec<SweepRow>> {
        let bar = if progress {
            let bar = ProgressBar::new(modes.len() as u64);
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} modes",
            ) {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut rows = Vec::with_capacity(modes.len());
        for &p in modes {
            let fit = eof_hindcast(
                decomposition,
                series.times(),
                series.values(),
                p,
                &self.train,
                &self.test,
            )?;
            rows.push(SweepRow {
                modes: p,
                skill: fit.skill,
                train_skill: fit.train_skill,
                test_rmse: fit.test_rmse,
                rank: fit.rank,
            });
            bar.inc(1);
        }
        bar.finish_and_clear();
        Ok(rows)
    }
}

/// Computes EOF principal components from `decomposition`, trains a linear
/// map on `train`, predicts on `test` and returns the correlation skill.
pub fn eof_hindcast(
    decomposition: &Decomposition,
    times: &[NaiveDate],
    target: &[f64],
    p: usize,
    train: &DateRange,
    test: &DateRange,
) -> HindcastResult<HindcastFit> {
    let n_time = decomposition.n_time();
    if times.len() != n_time {
        return Err(HindcastError::mismatch(
            "time axis length vs VT columns",
            n_time,
            times.len(),
        ));
    }
    if target.len() != n_time {
        return Err(HindcastError::mismatch(
            "target series length vs VT columns",
            n_time,
            target.len(),
        ));
    }
    decomposition.check_modes(p)?;

    let pcs = decomposition.principal_components(p)?;

    let train_idx = train.indices(times);
    let test_idx = test.indices(times);
    debug!(
        "Train window {} selects {} steps, test window {} selects {} steps",
        train,
        train_idx.len(),
        test,
        test_idx.len()
    );
    if train_idx.len() < 2 {
        return Err(HindcastError::DegenerateInput(format!(
            "train window {} selects {} time steps, need at least 2",
            train,
            train_idx.len()
        )));
    }
    if test_idx.len() < 2 {
        return Err(HindcastError::DegenerateInput(format!(
            "test window {} selects {} time steps, need at least 2",
            test,
            test_idx.len()
        )));
    }
    if let Some(i) = train_idx
        .iter()
        .chain(test_idx.iter())
        .find(|&&i| !target[i].is_finite())
    {
        return Err(HindcastError::DegenerateInput(format!(
            "target series has a non-finite value at {}",
            times[*i]
        )));
    }
    if let Some(i) = train_idx
        .iter()
        .chain(test_idx.iter())
        .find(|&&i| pcs.column(i).iter().any(|v| !v.is_finite()))
    {
        return Err(HindcastError::DegenerateInput(format!(
            "principal components have a non-finite value at {}",
            times[*i]
        )));
    }

    let (x_train, y_train) = design(&pcs, target, &train_idx);
    let (x_test, y_test) = design(&pcs, target, &test_idx);

    let lsq = solve_least_squares(&x_train, &y_train)?;
    if lsq.rank < p {
        warn!(
            "Training design is rank deficient: rank {} with {} modes",
            lsq.rank, p
        );
    }

    let fitted = &x_train * &lsq.beta;
    let train_skill = pearson(y_train.as_slice(), fitted.as_slice()).ok();

    let y_pred = &x_test * &lsq.beta;
    let skill = pearson(y_test.as_slice(), y_pred.as_slice())?;
    let test_rmse = rmse(y_test.as_slice(), y_pred.as_slice())?;

    Ok(HindcastFit {
        skill,
        beta: lsq.beta.iter().copied().collect(),
        modes: p,
        rank: lsq.rank,
        n_train: train_idx.len(),
        n_test: test_idx.len(),
        train_skill,
        test_rmse,
        test_times: test_idx.iter().map(|&i| times[i]).collect(),
        observed: y_test.iter().copied().collect(),
        predicted: y_pred.iter().copied().collect(),
    })
}

/// Gathers the selected columns of `pcs` as rows of a design matrix.
fn design(pcs: &DMatrix<f64>, target: &[f64], idx: &[usize]) -> (DMatrix<f64>, DVector<f64>) {
    let x = pcs.select_columns(idx).transpose();
    let y = DVector::from_iterator(idx.len(), idx.iter().map(|&i| target[i]));
    (x, y)
}
