use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::config::Config;
use crate::handler::{self, error_page};
use crate::http::parser::{expected_length, parse_http_request};
use crate::http::request::Request;
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;

const READ_CHUNK: usize = 1024;

/// Requests larger than this are answered with 400.
pub const MAX_REQUEST_SIZE: usize = 64 * 1024;

/// A client that sends nothing for this long is considered done sending.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// One client connection: a single request and a single response.
pub struct Connection<S> {
    stream: S,
    peer: SocketAddr,
    config: Arc<Config>,
    buffer: BytesMut,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Rejected(StatusCode),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, config: Arc<Config>) -> Self {
        Self {
            stream,
            peer,
            config,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        Some(Ok(req)) => ConnectionState::Processing(req),
                        Some(Err(status)) => ConnectionState::Rejected(status),
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing(req) => {
                    tracing::info!(
                        peer = %self.peer,
                        method = req.method.as_str(),
                        target = %req.target,
                        "Handling request"
                    );

                    let response = handler::route(req, self.peer, &self.config).await?;

                    tracing::info!(
                        peer = %self.peer,
                        status = response.status.as_u16(),
                        "Response ready"
                    );
                    self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                }

                ConnectionState::Rejected(status) => {
                    let response = error_page::respond(*status, &self.config).await?;
                    self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    if let Err(e) = self.stream.shutdown().await {
                        tracing::debug!(peer = %self.peer, error = %e, "Shutdown failed");
                    }
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until the request is complete, the client stops sending, or the
    /// size limit is hit.
    ///
    /// Returns `None` when the client sent nothing at all, and
    /// `Some(Err(status))` for a request that cannot be served.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Result<Request, StatusCode>>> {
        loop {
            if let Some(len) = expected_length(&self.buffer) {
                if len > MAX_REQUEST_SIZE {
                    return Ok(Some(Err(StatusCode::BAD_REQUEST)));
                }
                if self.buffer.len() >= len {
                    self.buffer.truncate(len);
                    break;
                }
            }

            if self.buffer.len() > MAX_REQUEST_SIZE {
                return Ok(Some(Err(StatusCode::BAD_REQUEST)));
            }

            self.buffer.reserve(READ_CHUNK);
            match timeout(IDLE_TIMEOUT, self.stream.read_buf(&mut self.buffer)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(_)) => {}
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => {
                    tracing::debug!(peer = %self.peer, received = self.buffer.len(), "Idle timeout while reading");
                    break;
                }
            }
        }

        if self.buffer.is_empty() {
            return Ok(None);
        }

        match parse_http_request(&self.buffer) {
            Ok(request) => Ok(Some(Ok(request))),
            Err(e) => {
                tracing::warn!(peer = %self.peer, error = %e, "Malformed request");
                Ok(Some(Err(StatusCode::BAD_REQUEST)))
            }
        }
    }
}
