//! Failure classes of a wrapper run
//!
//! Everything here is fatal for the run. Reporting failures are not
//! represented: the reporter swallows them.

use intercept_common::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Transport-level failure talking to the coordinating service.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("cannot start i/o runtime")]
    Runtime(#[source] std::io::Error),
    #[error("cannot connect to {endpoint}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o error talking to {endpoint}")]
    Io {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{endpoint} did not answer within {timeout_ms} ms")]
    Timeout { endpoint: String, timeout_ms: u128 },
    #[error("{endpoint} closed the connection without an answer")]
    NoAnswer { endpoint: String },
    #[error("malformed message")]
    Protocol(#[from] serde_json::Error),
}

/// The coordinating service could not tell us what to run.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error("execution rejected: {0}")]
    Rejected(String),
}

/// The OS refused to create the child process.
#[derive(Debug, Error)]
#[error("cannot spawn {}", executable.display())]
pub struct SpawnError {
    pub executable: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Signal handlers could not be installed.
#[derive(Debug, Error)]
pub enum SignalSetupError {
    #[error("cannot register signal handlers")]
    Register(#[source] std::io::Error),
    #[error("cannot start signal forwarding thread")]
    Thread(#[source] std::io::Error),
    #[error("cannot reset the child signal disposition")]
    ChildSignal(#[source] std::io::Error),
}

/// Waiting on the child failed for a reason other than an interruption.
#[derive(Debug, Error)]
#[error("cannot wait for process {pid}")]
pub struct WaitError {
    pub pid: u32,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Error)]
pub enum WrapperError {
    #[error("configuration error")]
    Config(#[from] ConfigError),
    #[error("cannot reach coordinating service")]
    Channel(#[from] ChannelError),
    #[error("resolution failed")]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error(transparent)]
    SignalSetup(#[from] SignalSetupError),
    #[error(transparent)]
    Wait(#[from] WaitError),
}
