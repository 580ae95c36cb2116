use super::{Channel, Reporter};
use intercept_common::{Envelope, Request};
use std::sync::Arc;
use std::time::Duration;

pub struct InterceptorClient {
    channel: Arc<Channel>,
    timeout: Duration,
}

impl InterceptorClient {
    pub fn new(channel: Arc<Channel>, timeout: Duration) -> Self {
        Self { channel, timeout }
    }
}

impl Reporter for InterceptorClient {
    fn report(&self, envelope: Envelope) {
        tracing::debug!(event = ?envelope.event, "reporting event");
        let request = Request::Report { envelope };
        if let Err(err) = self.channel.send(&request, self.timeout) {
            tracing::warn!("failed to report event: {:#}", anyhow::Error::new(err));
        }
    }
}
