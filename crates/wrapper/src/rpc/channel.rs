//! Line-oriented JSON transport to the coordinating service

use crate::errors::{ChannelError, WrapperError};
use intercept_common::protocol::encode_line;
use intercept_common::{Endpoint, Request, Response, Session};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, UnixStream};
use tokio::runtime::Runtime;

trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

/// Connection factory for one session. Every call opens a fresh
/// connection, so calls never interleave on the wire.
pub struct Channel {
    endpoint: Endpoint,
    runtime: Runtime,
}

impl Channel {
    pub fn open(session: &Session) -> Result<Self, WrapperError> {
        let endpoint = session.endpoint()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
            .map_err(ChannelError::Runtime)?;
        Ok(Self { endpoint, runtime })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Send one request and read exactly one response line.
    pub fn request(&self, request: &Request, timeout: Duration) -> Result<Response, ChannelError> {
        let line = encode_line(request)?;
        self.bounded(timeout, async {
            let mut stream = self.connect().await?;
            stream.write_all(&line).await.map_err(|e| self.io(e))?;
            stream.flush().await.map_err(|e| self.io(e))?;

            let mut reader = BufReader::new(stream);
            let mut answer = String::new();
            let read = reader.read_line(&mut answer).await.map_err(|e| self.io(e))?;
            if read == 0 {
                return Err(ChannelError::NoAnswer {
                    endpoint: self.endpoint.to_string(),
                });
            }
            Ok(serde_json::from_str(answer.trim_end())?)
        })
    }

    /// Send one request without waiting for anything back.
    pub fn send(&self, request: &Request, timeout: Duration) -> Result<(), ChannelError> {
        let line = encode_line(request)?;
        self.bounded(timeout, async {
            let mut stream = self.connect().await?;
            stream.write_all(&line).await.map_err(|e| self.io(e))?;
            stream.shutdown().await.map_err(|e| self.io(e))?;
            Ok(())
        })
    }

    fn bounded<T, F>(&self, timeout: Duration, operation: F) -> Result<T, ChannelError>
    where
        F: Future<Output = Result<T, ChannelError>>,
    {
        self.runtime.block_on(async {
            tokio::time::timeout(timeout, operation)
                .await
                .map_err(|_| ChannelError::Timeout {
                    endpoint: self.endpoint.to_string(),
                    timeout_ms: timeout.as_millis(),
                })?
        })
    }

    async fn connect(&self) -> Result<Box<dyn Stream>, ChannelError> {
        let connected: std::io::Result<Box<dyn Stream>> = match &self.endpoint {
            Endpoint::Tcp { host, port } => TcpStream::connect((host.as_str(), *port))
                .await
                .map(|stream| {
                    let _ = stream.set_nodelay(true);
                    Box::new(stream) as Box<dyn Stream>
                }),
            Endpoint::UnixSocket { path } => UnixStream::connect(path)
                .await
                .map(|stream| Box::new(stream) as Box<dyn Stream>),
        };
        connected.map_err(|source| ChannelError::Connect {
            endpoint: self.endpoint.to_string(),
            source,
        })
    }

    fn io(&self, source: std::io::Error) -> ChannelError {
        ChannelError::Io {
            endpoint: self.endpoint.to_string(),
            source,
        }
    }
}
