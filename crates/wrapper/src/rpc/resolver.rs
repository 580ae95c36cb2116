use super::{Channel, Resolver};
use crate::errors::ResolutionError;
use intercept_common::{Execution, Request, Response};
use std::sync::Arc;
use std::time::Duration;

pub struct SupervisorClient {
    channel: Arc<Channel>,
    timeout: Duration,
}

impl SupervisorClient {
    pub fn new(channel: Arc<Channel>, timeout: Duration) -> Self {
        Self { channel, timeout }
    }
}

impl Resolver for SupervisorClient {
    fn resolve(&self, requested: &Execution) -> Result<Execution, ResolutionError> {
        tracing::debug!(
            endpoint = %self.channel.endpoint(),
            executable = %requested.executable.display(),
            "resolving execution"
        );
        let request = Request::Resolve {
            execution: requested.clone(),
        };
        match self.channel.request(&request, self.timeout)? {
            Response::Resolved { execution } => {
                tracing::debug!(
                    executable = %execution.executable.display(),
                    arguments = ?execution.arguments,
                    "execution resolved"
                );
                Ok(execution)
            }
            Response::Rejected { reason } => Err(ResolutionError::Rejected(reason)),
        }
    }
}
