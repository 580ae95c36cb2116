//! Supervising wrapper for intercepted build commands
//!
//! The wrapper stands in for a build tool. It asks the coordinating service
//! what to actually run, runs it, forwards the signals it receives to the
//! child, and reports the child's lifecycle back to the service so the
//! build's commands can be reconstructed.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use intercept_wrapper::run_wrapper;
//!
//! fn main() -> anyhow::Result<()> {
//!     let exit_code = run_wrapper()?;
//!     std::process::exit(exit_code);
//! }
//! ```

#![cfg(unix)]

pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod forwarder;
pub mod logging;
pub mod process;
pub mod rpc;
pub mod supervisor;

mod disposition;
mod exec;

pub use config::WrapperConfig;
pub use context::{Invocation, WrapperCommand};
pub use errors::WrapperError;
pub use exec::{execute, run_wrapper};
pub use supervisor::Supervisor;
