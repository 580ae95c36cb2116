//! Wire messages exchanged with the coordinating service
//!
//! Each message is one JSON document on a single line. A resolve request is
//! answered by exactly one [`Response`] line; a report gets no answer.

use crate::event::Envelope;
use crate::execution::Execution;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Resolve { execution: Execution },
    Report { envelope: Envelope },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Resolved { execution: Execution },
    Rejected { reason: String },
}

/// Serialize a message as one newline-terminated line.
pub fn encode_line<T: Serialize>(message: &T) -> serde_json::Result<Vec<u8>> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    Ok(line)
}
