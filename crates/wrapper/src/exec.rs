//! Entry point tying bootstrap, configuration, clients and supervisor
//! together.

use crate::cli::Cli;
use crate::config::WrapperConfig;
use crate::context::{Invocation, WrapperCommand};
use crate::errors::WrapperError;
use crate::logging;
use crate::process::SpawnStrategy;
use crate::rpc::{Channel, InterceptorClient, SupervisorClient};
use crate::supervisor::Supervisor;
use anyhow::{Context, Result};
use clap::Parser;
use intercept_common::ConfigError;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

/// Run the wrapper for the current process and return its exit code.
pub fn run_wrapper() -> Result<i32> {
    let argv: Vec<String> = env::args_os()
        .map(|arg| arg.to_string_lossy().to_string())
        .collect();
    let environment: HashMap<String, String> = env::vars_os()
        .map(|(k, v)| (k.to_string_lossy().to_string(), v.to_string_lossy().to_string()))
        .collect();

    let invocation = Invocation::detect(&argv);
    let cli = match invocation {
        Invocation::Wrapper => None,
        // Prints usage and exits on bad flags.
        Invocation::DirectLaunch => Some(Cli::parse_from(&argv)),
    };

    let config = WrapperConfig::from_environment(&environment)
        .with_verbose(cli.as_ref().map(|cli| cli.verbose).unwrap_or(false));
    logging::init(&config)?;
    logging::record(&argv, &environment);

    let working_dir = env::current_dir()
        .map_err(|err| ConfigError::WorkingDirectory(err.to_string()))
        .map_err(WrapperError::from)
        .context("failed to capture the execution")?;

    let command = match cli {
        None => WrapperCommand::from_environment(argv, environment, working_dir),
        Some(cli) => WrapperCommand::from_arguments(cli, environment, working_dir),
    }
    .map_err(WrapperError::from)
    .with_context(|| format!("invalid {invocation:?} invocation"))?;

    execute(&command, &config).context("failed to supervise the execution")
}

/// Resolve, spawn and supervise one command against its session.
pub fn execute(command: &WrapperCommand, config: &WrapperConfig) -> Result<i32, WrapperError> {
    let channel = Arc::new(Channel::open(&command.session)?);
    let resolver = SupervisorClient::new(Arc::clone(&channel), config.resolve_timeout);
    let reporter = InterceptorClient::new(channel, config.report_timeout);

    Supervisor::new(&resolver, &reporter, SpawnStrategy::configured()).run(&command.execution)
}
