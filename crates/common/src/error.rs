use thiserror::Error;

/// Invalid or missing bootstrap input. Always raised before any RPC is
/// attempted and before any child exists.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown destination: ${0} is missing from the environment")]
    MissingDestination(&'static str),
    #[error("destination is empty")]
    EmptyDestination,
    #[error("invalid destination '{destination}': {reason}")]
    InvalidDestination { destination: String, reason: String },
    #[error("no command to execute")]
    EmptyCommand,
    #[error("cannot determine working directory: {0}")]
    WorkingDirectory(String),
}
