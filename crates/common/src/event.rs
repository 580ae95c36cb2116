//! Lifecycle events of a supervised process and their factory

use crate::execution::Execution;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One observation about the supervised child.
///
/// A run reports exactly one `Start`, then any number of `Signal`s, and
/// ends with exactly one terminal event (`Terminate`, or `Signal` when the
/// child was killed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Start {
        pid: u32,
        parent_pid: u32,
        execution: Execution,
    },
    Signal {
        number: i32,
    },
    Terminate {
        exit_code: i32,
    },
}

/// Event plus the metadata the aggregation service needs to order and
/// group it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Identifies the supervisor run that produced the event.
    pub rid: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: Event,
}

/// Builds envelopes for one supervisor run.
#[derive(Debug, Clone)]
pub struct EventFactory {
    rid: Uuid,
}

impl Default for EventFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EventFactory {
    pub fn new() -> Self {
        Self {
            rid: Uuid::now_v7(),
        }
    }

    pub fn rid(&self) -> Uuid {
        self.rid
    }

    pub fn start(&self, pid: u32, parent_pid: u32, execution: Execution) -> Envelope {
        self.wrap(Event::Start {
            pid,
            parent_pid,
            execution,
        })
    }

    pub fn signal(&self, number: i32) -> Envelope {
        self.wrap(Event::Signal { number })
    }

    pub fn terminate(&self, exit_code: i32) -> Envelope {
        self.wrap(Event::Terminate { exit_code })
    }

    fn wrap(&self, event: Event) -> Envelope {
        Envelope {
            rid: self.rid,
            timestamp: Utc::now(),
            event,
        }
    }
}
