//! Destination of the coordinating service for one build invocation tree

use crate::error::ConfigError;
use std::fmt;
use std::path::PathBuf;

/// Identifies where both the resolver and the reporter connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub destination: String,
}

/// Parsed form of a session destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Unix domain socket.
    UnixSocket { path: PathBuf },
    /// TCP connection.
    Tcp { host: String, port: u16 },
}

impl Session {
    pub fn new(destination: impl Into<String>) -> Result<Self, ConfigError> {
        let destination = destination.into();
        if destination.trim().is_empty() {
            return Err(ConfigError::EmptyDestination);
        }
        Ok(Self { destination })
    }

    /// Parse the destination.
    ///
    /// Accepted forms: `unix:<path>`, an absolute socket path,
    /// `tcp://<host>:<port>` and `<host>:<port>`.
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        let destination = self.destination.trim();
        let invalid = |reason: &str| ConfigError::InvalidDestination {
            destination: self.destination.clone(),
            reason: reason.to_string(),
        };

        if let Some(path) = destination.strip_prefix("unix:") {
            if path.is_empty() {
                return Err(invalid("socket path is empty"));
            }
            return Ok(Endpoint::UnixSocket {
                path: PathBuf::from(path),
            });
        }
        if destination.starts_with('/') {
            return Ok(Endpoint::UnixSocket {
                path: PathBuf::from(destination),
            });
        }

        let address = destination.strip_prefix("tcp://").unwrap_or(destination);
        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected <host>:<port>"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(invalid("host is empty"));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| invalid("port is not a number between 0 and 65535"))?;

        Ok(Endpoint::Tcp {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnixSocket { path } => write!(f, "unix:{}", path.display()),
            Self::Tcp { host, port } => write!(f, "{host}:{port}"),
        }
    }
}
