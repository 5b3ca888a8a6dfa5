//! # CLI Integration Tests
//!
//! Argument parsing for every subcommand, global flags and invalid input.

#[cfg(test)]
mod tests {
    use clap::Parser;
    use clap_complete::Shell;
    use std::path::PathBuf;

    use crate::cli::{Cli, Commands, ConfigFormat, OutputFormat, merge_args};
    use crate::input::HindcastConfig;
    use crate::split::DateRange;

    #[test]
    fn test_cli_help() {
        let result = Cli::try_parse_from(["eof-hindcast", "--help"]);
        assert!(result.is_err());

        let error = result.unwrap_err();
        assert!(error.to_string().contains("hindcast"));
    }

    #[test]
    fn test_cli_version() {
        let result = Cli::try_parse_from(["eof-hindcast", "--version"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "eof-hindcast",
            "--verbose",
            "--output-format",
            "json",
            "--config",
            "/path/to/job.yaml",
            "template",
        ]);

        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert_eq!(cli.output_format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/job.yaml")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["eof-hindcast", "template", "-q", "--output-format", "yaml"]);
        assert!(cli.quiet);
        assert_eq!(cli.output_format, OutputFormat::Yaml);
    }

    #[test]
    fn test_verbose_quiet_conflict() {
        let result = Cli::try_parse_from(["eof-hindcast", "-v", "-q", "template"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_evaluate_command_inputs() {
        let cli = Cli::parse_from([
            "eof-hindcast",
            "evaluate",
            "--u",
            "u.parquet",
            "--s",
            "s.csv",
            "--vt",
            "v.parquet",
            "--transpose-vt",
            "--series",
            "index.csv",
            "--value-column",
            "msl",
            "--train",
            "1979-01-01..2000-12-31",
            "--predictions",
            "pred.parquet",
        ]);

        if let Commands::Evaluate {
            inputs,
            window,
            predictions,
        } = &cli.command
        {
            assert_eq!(inputs.u.as_deref(), Some("u.parquet"));
            assert_eq!(inputs.s.as_deref(), Some("s.csv"));
            assert_eq!(inputs.vt.as_deref(), Some("v.parquet"));
            assert!(inputs.transpose_vt);
            assert_eq!(inputs.series.as_deref(), Some("index.csv"));
            assert_eq!(inputs.value_column.as_deref(), Some("msl"));
            assert_eq!(
                window.train,
                Some(DateRange::from_ymd((1979, 1, 1), (2000, 12, 31)).unwrap())
            );
            assert_eq!(predictions.as_deref(), Some("pred.parquet"));
        } else {
            panic!("Expected Evaluate command");
        }
    }

    #[test]
    fn test_evaluate_mode_flags() {
        for flag in ["-p", "--modes"] {
            let cli = Cli::parse_from(["eof-hindcast", "evaluate", flag, "15"]);
            if let Commands::Evaluate { window, .. } = &cli.command {
                assert_eq!(window.modes, Some(15));
            } else {
                panic!("Expected Evaluate command");
            }
        }
    }

    #[test]
    fn test_invalid_windows_rejected() {
        for window in [
            "2000-01-01",
            "2000-13-01..2001-01-01",
            "2001-01-01..2000-01-01",
            "yesterday..today",
        ] {
            let result = Cli::try_parse_from(["eof-hindcast", "evaluate", "--train", window]);
            assert!(result.is_err(), "accepted {}", window);
        }
    }

    #[test]
    fn test_invalid_mode_count_rejected() {
        let result = Cli::try_parse_from(["eof-hindcast", "evaluate", "-p", "ten"]);
        assert!(result.is_err());
        let result = Cli::try_parse_from(["eof-hindcast", "evaluate", "-p", "-3"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sweep_command() {
        let cli = Cli::parse_from([
            "eof-hindcast",
            "sweep",
            "--series",
            "index.parquet",
            "--max-modes",
            "30",
        ]);

        if let Commands::Sweep {
            inputs, max_modes, ..
        } = &cli.command
        {
            assert_eq!(inputs.series.as_deref(), Some("index.parquet"));
            assert_eq!(*max_modes, Some(30));
        } else {
            panic!("Expected Sweep command");
        }
    }

    #[test]
    fn test_info_command() {
        let cli = Cli::parse_from(["eof-hindcast", "info", "--s", "s.csv"]);
        if let Commands::Info { inputs, top } = &cli.command {
            assert_eq!(inputs.s.as_deref(), Some("s.csv"));
            assert_eq!(*top, 10);
        } else {
            panic!("Expected Info command");
        }

        let cli = Cli::parse_from(["eof-hindcast", "info", "--top", "3"]);
        if let Commands::Info { top, .. } = &cli.command {
            assert_eq!(*top, 3);
        } else {
            panic!("Expected Info command");
        }
    }

    #[test]
    fn test_info_does_not_take_windows() {
        let result = Cli::try_parse_from(["eof-hindcast", "info", "-p", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["eof-hindcast", "validate", "job.json", "--detailed"]);
        if let Commands::Validate {
            config_file,
            detailed,
        } = &cli.command
        {
            assert_eq!(config_file, &Some(PathBuf::from("job.json")));
            assert!(*detailed);
        } else {
            panic!("Expected Validate command");
        }

        let cli = Cli::parse_from(["eof-hindcast", "validate"]);
        if let Commands::Validate { config_file, .. } = &cli.command {
            assert!(config_file.is_none());
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_template_command() {
        let cli = Cli::parse_from(["eof-hindcast", "template"]);
        if let Commands::Template { output, format } = &cli.command {
            assert!(output.is_none());
            assert_eq!(*format, ConfigFormat::Json);
        } else {
            panic!("Expected Template command");
        }

        let cli = Cli::parse_from([
            "eof-hindcast",
            "template",
            "--format",
            "yaml",
            "-o",
            "job.yaml",
        ]);
        if let Commands::Template { output, format } = &cli.command {
            assert_eq!(output, &Some(PathBuf::from("job.yaml")));
            assert_eq!(*format, ConfigFormat::Yaml);
        } else {
            panic!("Expected Template command");
        }
    }

    #[test]
    fn test_completions_command() {
        let cli = Cli::parse_from(["eof-hindcast", "completions", "bash"]);
        if let Commands::Completions { shell, output } = &cli.command {
            assert_eq!(*shell, Shell::Bash);
            assert!(output.is_none());
        } else {
            panic!("Expected Completions command");
        }

        assert!(Cli::try_parse_from(["eof-hindcast", "completions", "cmd"]).is_err());
    }

    #[test]
    fn test_invalid_output_format() {
        let result = Cli::try_parse_from(["eof-hindcast", "--output-format", "xml", "template"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_subcommand() {
        let result = Cli::try_parse_from(["eof-hindcast"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parsed_arguments_override_config() {
        let cli = Cli::parse_from([
            "eof-hindcast",
            "sweep",
            "--vt",
            "override.csv",
            "--time-column",
            "date",
            "--train",
            "1990-01-01..1999-12-31",
        ]);
        let Commands::Sweep { inputs, window, .. } = &cli.command else {
            panic!("Expected Sweep command");
        };

        let mut base = HindcastConfig::default();
        base.inputs.u = Some("from_file_u.csv".to_string());
        base.inputs.vt = Some("from_file_vt.csv".to_string());
        let merged = merge_args(base, inputs, Some(window));

        assert_eq!(merged.inputs.u.as_deref(), Some("from_file_u.csv"));
        assert_eq!(merged.inputs.vt.as_deref(), Some("override.csv"));
        assert_eq!(merged.inputs.time_column, "date");
        assert_eq!(merged.train.to_string(), "1990-01-01..1999-12-31");
    }
}
