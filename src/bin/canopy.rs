//! canopy CLI Binary
//!
//! Command-line front end for resolving identifiers against tree definitions.

use anyhow::Context;
use canopy::cli::{Cli, RunContext};
use canopy::config::ConfigLoader;
use canopy::logging::{init_logging, LoggingConfig};
use clap::Parser;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("canopy starting");

    match run(&cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Command failed: {:#}", e);
            match e.downcast_ref::<canopy::error::ApiError>() {
                Some(api) => eprintln!("{}", canopy::cli::map_error(api)),
                None => eprintln!("{:#}", e),
            }
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = RunContext::new(
        cli.workspace.clone(),
        cli.config.clone(),
        cli.definitions.clone(),
    )
    .with_context(|| format!("initializing workspace {}", cli.workspace.display()))?;
    info!(definitions = %context.definitions_path().display(), "CLI context initialized");

    Ok(context.execute(&cli.command)?)
}

/// Build logging configuration from CLI args and config file.
/// Precedence: CLI flags override config file override defaults; env vars are
/// applied last by `init_logging`.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let loaded = match cli.config {
        Some(ref config_path) => ConfigLoader::load_from_file(config_path),
        None => ConfigLoader::load(&cli.workspace),
    };
    let mut config = loaded.map(|c| c.logging).unwrap_or_default();

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(format) = cli.log_format.as_deref().and_then(|f| f.parse().ok()) {
        config.format = format;
    }
    if let Some(output) = cli.log_output.as_deref().and_then(|o| o.parse().ok()) {
        config.output = output;
    }
    config
}
