//! How this invocation was started and what it was asked to run
//!
//! The same binary serves two roles. Reached through a link named after a
//! build tool (`cc`, `ld`, ...) it is a wrapper and reads everything from
//! its own argv and environment. Run as `wrapper` it is launched directly
//! by the build supervisor and reads flags instead. Both end up with the
//! same [`WrapperCommand`].

use crate::cli::Cli;
use intercept_common::env::KEY_DESTINATION;
use intercept_common::{ConfigError, Execution, Session};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File name of the binary when launched directly.
pub const WRAPPER_NAME: &str = "wrapper";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invocation {
    /// Called through a link, in place of a build tool.
    Wrapper,
    /// Called by name, with flags.
    DirectLaunch,
}

impl Invocation {
    pub fn detect(argv: &[String]) -> Self {
        let called_as = argv
            .first()
            .and_then(|arg0| Path::new(arg0).file_name())
            .map(|name| name.to_string_lossy().to_string());
        match called_as.as_deref() {
            Some(WRAPPER_NAME) => Self::DirectLaunch,
            _ => Self::Wrapper,
        }
    }
}

/// A session plus the requested execution: everything the supervisor
/// needs to start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrapperCommand {
    pub session: Session,
    pub execution: Execution,
}

impl WrapperCommand {
    /// Wrapper mode: destination from the environment, execution from our
    /// own argv.
    pub fn from_environment(
        argv: Vec<String>,
        environment: HashMap<String, String>,
        working_dir: PathBuf,
    ) -> Result<Self, ConfigError> {
        let destination = environment
            .get(KEY_DESTINATION)
            .cloned()
            .ok_or(ConfigError::MissingDestination(KEY_DESTINATION))?;
        let session = Session::new(destination)?;
        let execution = Execution::capture(argv, environment, working_dir)?;

        Ok(Self { session, execution })
    }

    /// Direct-launch mode: destination, executable and command line from
    /// flags, environment inherited as is.
    pub fn from_arguments(
        cli: Cli,
        environment: HashMap<String, String>,
        working_dir: PathBuf,
    ) -> Result<Self, ConfigError> {
        let session = Session::new(cli.destination)?;
        let execution = Execution::capture(cli.command, environment, working_dir)?
            .with_executable(&cli.execute);

        Ok(Self { session, execution })
    }
}
