//! Clients of the coordinating service
//!
//! The supervisor only sees the [`Resolver`] and [`Reporter`] contracts;
//! [`SupervisorClient`] and [`InterceptorClient`] implement them over a
//! shared [`Channel`].

mod channel;
mod reporter;
mod resolver;

pub use channel::Channel;
pub use reporter::InterceptorClient;
pub use resolver::SupervisorClient;

use crate::errors::ResolutionError;
use intercept_common::{Envelope, Execution};

/// Asks the coordinating service how a requested execution shall run.
pub trait Resolver {
    fn resolve(&self, requested: &Execution) -> Result<Execution, ResolutionError>;
}

/// Best-effort delivery of lifecycle events. Never fails the caller and
/// never blocks longer than its configured bound.
pub trait Reporter {
    fn report(&self, envelope: Envelope);
}
