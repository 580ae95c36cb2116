//! Shared types for the intercept wrapper
//!
//! These are the values exchanged between the wrapper process and the
//! coordinating service: the command to run ([`Execution`]), where the
//! service lives ([`Session`]), and the lifecycle records the wrapper
//! reports about its child ([`Envelope`] / [`Event`]).

pub mod env;
pub mod error;
pub mod event;
pub mod execution;
pub mod protocol;
pub mod session;

pub use error::ConfigError;
pub use event::{Envelope, Event, EventFactory};
pub use execution::Execution;
pub use protocol::{Request, Response};
pub use session::{Endpoint, Session};

/// Exit code used when the child has no exit code of its own (killed by a
/// signal, never started) or the wrapper itself failed.
pub const EXIT_FAILURE: i32 = 1;
