//! Healthcare encounter ETL CLI.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use hcetl_cli::commands::{run_etl, run_normalize, schema_ddl};
use hcetl_cli::config::{EtlConfig, SinkDriver};
use hcetl_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{
    Cli, Command, LogFormatArg, LogLevelArg, NormalizeArgs, RunArgs, SinkDriverArg, TargetArgs,
};
use crate::summary::{print_normalize_summary, print_run_summary};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "command failed");
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: &Cli) -> Result<()> {
    let mut config = EtlConfig::load(cli.config.as_deref())?;
    match &cli.command {
        Command::Run(args) => {
            apply_run_args(&mut config, args);
            let report = run_etl(&config, args.dry_run, args.report.as_deref())?;
            print_run_summary(&report);
        }
        Command::Normalize(args) => {
            apply_normalize_args(&mut config, args);
            let outcome = run_normalize(&config, args.output.as_deref())?;
            print_normalize_summary(&outcome, args.show_issues);
        }
        Command::Schema(args) => {
            apply_target_args(&mut config, args);
            for statement in schema_ddl(&config.target)? {
                println!("{statement};\n");
            }
        }
    }
    Ok(())
}

fn apply_target_args(config: &mut EtlConfig, args: &TargetArgs) {
    if let Some(schema) = &args.schema {
        config.target.schema = schema.clone();
    }
    if let Some(table) = &args.fact_table {
        config.target.fact_table = table.clone();
    }
}

fn apply_run_args(config: &mut EtlConfig, args: &RunArgs) {
    if let Some(source) = &args.source {
        config.source = Some(source.clone());
    }
    apply_target_args(config, &args.target);
    if let Some(driver) = args.sink {
        config.set_sink_driver(match driver {
            SinkDriverArg::Sqlite => SinkDriver::Sqlite,
            SinkDriverArg::Csv => SinkDriver::Csv,
        });
    }
    if let Some(path) = &args.sink_path {
        config.sink_path = path.clone();
    }
    if args.max_field_failures.is_some() {
        config.max_field_failures = args.max_field_failures;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if args.sequential {
        config.parallel_dimensions = false;
    }
}

fn apply_normalize_args(config: &mut EtlConfig, args: &NormalizeArgs) {
    if let Some(source) = &args.source {
        config.source = Some(source.clone());
    }
    if args.max_field_failures.is_some() {
        config.max_field_failures = args.max_field_failures;
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
