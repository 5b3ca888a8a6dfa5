use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use eof_hindcast::cli::{
    Cli, Commands, ConfigFormat, OutputFormat, load_base_config, merge_args,
};
use eof_hindcast::info::{
    print_inputs_info_csv, print_inputs_info_human, print_inputs_info_json,
    print_inputs_info_yaml,
};
use eof_hindcast::input::HindcastConfig;
use eof_hindcast::log::{config_echo, show_farewell_with_timing, show_greeting};
use eof_hindcast::output::{format_report, format_sweep};
use eof_hindcast::{inspect_inputs, run_hindcast_job, run_mode_sweep};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    run(cli)
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let start_time = Instant::now();
    let chatty = !cli.quiet && cli.output_format == OutputFormat::Human;
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Evaluate {
            inputs,
            window,
            predictions,
        } => {
            if chatty {
                show_greeting("evaluate");
            }
            let mut config = merge_args(base_config(config_path)?, inputs, Some(window));
            if let Some(predictions) = predictions {
                config.predictions = Some(predictions.clone());
            }
            if chatty {
                config_echo(&config);
                println!();
            }

            let report = run_hindcast_job(&config).context("Hindcast evaluation failed")?;
            ::log::info!(
                "Skill {:.4} with {} modes ({} train / {} test steps)",
                report.result.skill(),
                report.result.fit.modes,
                report.result.fit.n_train,
                report.result.fit.n_test
            );
            print!("{}", format_report(&report, &cli.output_format)?);
        }
        Commands::Sweep {
            inputs,
            window,
            max_modes,
        } => {
            if chatty {
                show_greeting("sweep");
            }
            let config = merge_args(base_config(config_path)?, inputs, Some(window));
            if chatty {
                config_echo(&config);
                println!();
            }

            let rows = run_mode_sweep(&config, *max_modes, chatty).context("Mode sweep failed")?;
            print!("{}", format_sweep(&rows, &cli.output_format)?);
        }
        Commands::Info { inputs, top } => {
            let config = merge_args(base_config(config_path)?, inputs, None);
            let info = inspect_inputs(&config, *top).context("Failed to inspect inputs")?;
            match cli.output_format {
                OutputFormat::Human => print_inputs_info_human(&info),
                OutputFormat::Json => print_inputs_info_json(&info)?,
                OutputFormat::Yaml => print_inputs_info_yaml(&info)?,
                OutputFormat::Csv => print_inputs_info_csv(&info)?,
            }
        }
        Commands::Validate {
            config_file,
            detailed,
        } => {
            let path = config_file
                .as_deref()
                .or(config_path)
                .context("No configuration file given: pass a path or --config")?;
            let config = HindcastConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration: {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("Invalid configuration: {}", path.display()))?;
            if !cli.quiet {
                println!("Configuration is valid: {}", path.display());
                if *detailed {
                    config_echo(&config);
                }
            }
        }
        Commands::Template { output, format } => {
            let config = HindcastConfig::default();
            let text = match format {
                ConfigFormat::Json => config.to_json()?,
                ConfigFormat::Yaml => config.to_yaml()?,
            };
            write_text(output.as_ref(), &text)?;
        }
        Commands::Completions { shell, output } => {
            let mut command = Cli::command();
            let mut buffer = Vec::new();
            clap_complete::generate(*shell, &mut command, "eof-hindcast", &mut buffer);
            write_text(output.as_ref(), &String::from_utf8_lossy(&buffer))?;
        }
    }

    if chatty && matches!(cli.command, Commands::Evaluate { .. } | Commands::Sweep { .. }) {
        show_farewell_with_timing(start_time.elapsed());
    }
    Ok(())
}

fn base_config(path: Option<&Path>) -> Result<HindcastConfig> {
    load_base_config(path).with_context(|| match path {
        Some(path) => format!("Failed to load configuration: {}", path.display()),
        None => "Failed to build default configuration".to_string(),
    })
}

fn write_text(output: Option<&PathBuf>, text: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
