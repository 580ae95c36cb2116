use clap::Parser;
use std::path::PathBuf;

/// Flags of the direct-launch mode, used when the binary is run under its
/// own name by the build supervisor.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "wrapper",
    version = env!("WRAPPER_VERSION"),
    about = "Run a command under supervision and report its lifecycle"
)]
pub struct Cli {
    /// Address of the coordinating service (host:port or unix:/path)
    #[arg(long, value_name = "ADDRESS")]
    pub destination: String,

    /// Path of the executable to run
    #[arg(long, value_name = "PATH")]
    pub execute: PathBuf,

    /// Log every step to stderr
    #[arg(long, short)]
    pub verbose: bool,

    /// The command line, program name first
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}
