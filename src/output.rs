//! # Report and Predictions Output
//!
//! Renders skill reports in the formats offered by the CLI and writes the
//! held-out predictions table (`time`, `observed`, `predicted`) to Parquet or
//! CSV.

use crate::cli::OutputFormat;
use crate::error::HindcastResult;
use crate::evaluator::{HindcastFit, HindcastSkill, SweepRow};
use crate::extract::{TableFormat, UNIX_EPOCH_DATE};
use crate::input::Region;
use crate::split::DateRange;
use log::debug;
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// Everything reported for a single evaluation
#[derive(Debug, Clone, Serialize)]
pub struct SkillReport {
    pub source: String,
    pub region: Region,
    pub train: DateRange,
    pub test: DateRange,
    #[serde(flatten)]
    pub result: HindcastSkill,
}

impl SkillReport {
    pub fn new(
        source: String,
        region: Region,
        train: DateRange,
        test: DateRange,
        result: HindcastSkill,
    ) -> Self {
        Self {
            source,
            region,
            train,
            test,
            result,
        }
    }
}

const REPORT_CSV_HEADER: &str =
    "modes,skill,train_skill,test_rmse,rank,n_train,n_test,elapsed_seconds";

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Renders a single-evaluation report.
pub fn format_report(report: &SkillReport, format: &OutputFormat) -> HindcastResult<String> {
    let fit = &report.result.fit;
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Yaml => serde_yaml::to_string(report)?,
        OutputFormat::Csv => format!(
            "{}\n{},{},{},{},{},{},{},{}\n",
            REPORT_CSV_HEADER,
            fit.modes,
            fit.skill,
            optional(fit.train_skill),
            fit.test_rmse,
            fit.rank,
            fit.n_train,
            fit.n_test,
            report.result.elapsed_seconds()
        ),
        OutputFormat::Human => {
            let mut lines = vec![
                "Hindcast skill report".to_string(),
                format!("  Target series: {}", report.source),
                format!("  Region: {}", report.region),
                format!("  Retained modes: {} (rank {})", fit.modes, fit.rank),
                format!("  Train window: {} ({} steps)", report.train, fit.n_train),
                format!("  Test window: {} ({} steps)", report.test, fit.n_test),
            ];
            if let Some(train_skill) = fit.train_skill {
                lines.push(format!("  In-sample correlation: {:.4}", train_skill));
            }
            lines.push(format!("  Test RMSE: {:.4}", fit.test_rmse));
            lines.push(format!("  Skill (correlation): {:.4}", fit.skill));
            lines.push(format!(
                "  Elapsed: {:.3} s",
                report.result.elapsed_seconds()
            ));
            lines.join("\n") + "\n"
        }
    };
    Ok(text)
}

/// Renders the rows of a mode sweep.
pub fn format_sweep(rows: &[SweepRow], format: &OutputFormat) -> HindcastResult<String> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(rows)?,
        OutputFormat::Yaml => serde_yaml::to_string(rows)?,
        OutputFormat::Csv => {
            let mut out = String::from("modes,skill,train_skill,test_rmse,rank\n");
            for row in rows {
                out.push_str(&format!(
                    "{},{},{},{},{}\n",
                    row.modes,
                    row.skill,
                    optional(row.train_skill),
                    row.test_rmse,
                    row.rank
                ));
            }
            out
        }
        OutputFormat::Human => {
            let mut out = String::from(" modes    skill   in-sample   test RMSE   rank\n");
            for row in rows {
                let train = row
                    .train_skill
                    .map(|v| format!("{:>9.4}", v))
                    .unwrap_or_else(|| format!("{:>9}", "-"));
                out.push_str(&format!(
                    "{:>6} {:>8.4}   {}   {:>9.4}   {:>4}\n",
                    row.modes, row.skill, train, row.test_rmse, row.rank
                ));
            }
            if let Some(best) = rows
                .iter()
                .max_by(|a, b| a.skill.total_cmp(&b.skill))
            {
                out.push_str(&format!(
                    "Best skill {:.4} with {} modes\n",
                    best.skill, best.modes
                ));
            }
            out
        }
    };
    Ok(text)
}

/// Builds the held-out predictions table.
pub fn predictions_dataframe(fit: &HindcastFit) -> HindcastResult<DataFrame> {
    let days: Vec<i32> = fit
        .test_times
        .iter()
        .map(|t| (*t - UNIX_EPOCH_DATE).num_days() as i32)
        .collect();
    let time = Series::new("time".into(), days).cast(&DataType::Date)?;
    let observed = Series::new("observed".into(), fit.observed.clone());
    let predicted = Series::new("predicted".into(), fit.predicted.clone());
    let df = DataFrame::new(vec![time.into(), observed.into(), predicted.into()])?;
    Ok(df)
}

/// Writes the held-out predictions, choosing Parquet or CSV by extension.
pub fn write_predictions<P: AsRef<Path>>(fit: &HindcastFit, output_path: P) -> HindcastResult<()> {
    let output_path = output_path.as_ref();
    let mut df = predictions_dataframe(fit)?;
    debug!(
        "Writing {} predictions to {}",
        df.height(),
        output_path.display()
    );

    let file = File::create(output_path)?;
    match TableFormat::from_path(output_path) {
        TableFormat::Parquet => {
            ParquetWriter::new(file).finish(&mut df)?;
        }
        TableFormat::Csv => {
            let mut file = file;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)?;
        }
    }
    debug!("Successfully wrote predictions: {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::read_table;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn sample_fit() -> HindcastFit {
        let d = |day| NaiveDate::from_ymd_opt(2011, 1, day).unwrap();
        HindcastFit {
            skill: 0.75,
            beta: vec![0.5, -0.25],
            modes: 2,
            rank: 2,
            n_train: 30,
            n_test: 3,
            train_skill: Some(0.8),
            test_rmse: 0.1,
            test_times: vec![d(1), d(2), d(3)],
            observed: vec![1.0, 2.0, 3.0],
            predicted: vec![1.1, 1.9, 3.2],
        }
    }

    fn sample_report() -> SkillReport {
        SkillReport::new(
            "index.parquet".to_string(),
            Region::default(),
            "1980-01-01..2010-12-31".parse().unwrap(),
            "2011-01-01..2022-12-31".parse().unwrap(),
            HindcastSkill {
                fit: sample_fit(),
                elapsed: Duration::from_millis(250),
            },
        )
    }

    #[test]
    fn test_json_report_fields() {
        let text = format_report(&sample_report(), &OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["skill"], 0.75);
        assert_eq!(value["modes"], 2);
        assert_eq!(value["elapsed_seconds"], 0.25);
        assert_eq!(value["train"], "1980-01-01..2010-12-31");
        assert_eq!(value["beta"][1], -0.25);
        assert!(value.get("observed").is_none());
    }

    #[test]
    fn test_csv_report() {
        let text = format_report(&sample_report(), &OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], REPORT_CSV_HEADER);
        assert_eq!(lines[1], "2,0.75,0.8,0.1,2,30,3,0.25");
    }

    #[test]
    fn test_human_report() {
        let text = format_report(&sample_report(), &OutputFormat::Human).unwrap();
        assert!(text.contains("Skill (correlation): 0.7500"));
        assert!(text.contains("Train window: 1980-01-01..2010-12-31 (30 steps)"));
        assert!(text.contains("Region: lat 10..-10, lon 90..130"));
    }

    #[test]
    fn test_human_report_layout() {
        let mut report = sample_report();
        let text = format_report(&report, &OutputFormat::Human).unwrap();
        assert!(text.starts_with("Hindcast skill report\n"));
        assert!(text.ends_with(" s\n"));
        let with_train = text.lines().count();
        assert!(text.contains("In-sample correlation"));

        report.result.fit.train_skill = None;
        let text = format_report(&report, &OutputFormat::Human).unwrap();
        assert!(!text.contains("In-sample correlation"));
        assert_eq!(text.lines().count(), with_train - 1);
    }

    #[test]
    fn test_sweep_formats() {
        let rows = vec![
            SweepRow {
                modes: 1,
                skill: 0.4,
                train_skill: Some(0.5),
                test_rmse: 1.0,
                rank: 1,
            },
            SweepRow {
                modes: 2,
                skill: 0.6,
                train_skill: None,
                test_rmse: 0.9,
                rank: 2,
            },
        ];
        let csv = format_sweep(&rows, &OutputFormat::Csv).unwrap();
        assert!(csv.contains("1,0.4,0.5,1,1"));
        assert!(csv.contains("2,0.6,,0.9,2"));

        let human = format_sweep(&rows, &OutputFormat::Human).unwrap();
        assert!(human.contains("Best skill 0.6000 with 2 modes"));

        let yaml = format_sweep(&rows, &OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("modes: 2"));
    }

    #[test]
    fn test_write_predictions_parquet_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let fit = sample_fit();

        let parquet = dir.path().join("pred.parquet");
        write_predictions(&fit, &parquet).unwrap();
        let df = read_table(&parquet).unwrap();
        assert_eq!(df.shape(), (3, 3));
        assert_eq!(df.column("time").unwrap().dtype(), &DataType::Date);

        let csv = dir.path().join("pred.csv");
        write_predictions(&fit, &csv).unwrap();
        let text = std::fs::read_to_string(&csv).unwrap();
        assert!(text.starts_with("time,observed,predicted"));
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("2011-01-02,"));
    }
}
