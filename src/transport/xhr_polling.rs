//! The xhr-polling transport.
//!
//! # Responsibilities
//! - Hijack one HTTP exchange per socket and apply liveness deadlines
//! - Expose the duplex-stream contract (accept, read, write, close)
//! - Frame the single outbound message as a complete HTTP/1.0 response
//! - Close the connection unconditionally after the outbound write
//!
//! One socket corresponds to one physical connection and one HTTP request.
//! It is driven by a single logical flow of control and carries no internal
//! locking; callers that split inbound and outbound pumps must coordinate
//! access themselves.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::Instant;

use crate::config::DeadlineConfig;
use crate::error::TransportError;
use crate::net::conn::BoxedConn;
use crate::net::exchange::Exchange;
use crate::transport::Transport;

/// Stateless descriptor for the xhr-polling transport.
///
/// Constructed once at server startup with fixed deadlines; immutable and
/// shared by every socket it creates.
#[derive(Debug)]
pub struct XhrPollingTransport {
    read_timeout: Duration,
    write_timeout: Duration,
}

impl XhrPollingTransport {
    /// Descriptor with the given read and write timeouts (zero disables).
    pub fn new(read_timeout: Duration, write_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            read_timeout,
            write_timeout,
        })
    }

    /// Descriptor from a deadline config section.
    pub fn from_config(config: &DeadlineConfig) -> Arc<Self> {
        Self::new(config.read_timeout(), config.write_timeout())
    }
}

impl Transport for XhrPollingTransport {
    type Socket = XhrPollingSocket;

    fn resource(&self) -> &'static str {
        "xhr-polling"
    }

    fn new_socket(self: &Arc<Self>) -> XhrPollingSocket {
        XhrPollingSocket {
            transport: Arc::clone(self),
            conn: None,
            origin: None,
            leftover: Bytes::new(),
        }
    }
}

/// Per-exchange polling socket.
///
/// State machine: `Unconnected --accept--> Connected --close|write-->
/// Unconnected` (terminal for this instance). Connectedness is the presence
/// of the owned connection.
pub struct XhrPollingSocket {
    transport: Arc<XhrPollingTransport>,
    conn: Option<BoxedConn>,
    origin: Option<String>,
    leftover: Bytes,
}

impl XhrPollingSocket {
    /// Whether a live connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// The descriptor this socket was created by.
    pub fn transport(&self) -> &Arc<XhrPollingTransport> {
        &self.transport
    }

    /// Take exclusive ownership of the connection underlying `exchange`.
    ///
    /// On success: records the request origin, applies the configured
    /// deadlines as absolute expiries on the raw connection, marks the
    /// socket connected and invokes `proceed` so the session layer can start
    /// exchanging data. A hijack failure is propagated and leaves the
    /// exchange with the HTTP layer.
    pub async fn accept<E, F>(&mut self, exchange: E, proceed: F) -> Result<(), TransportError>
    where
        E: Exchange,
        F: FnOnce(),
    {
        if self.conn.is_some() {
            return Err(TransportError::AlreadyConnected);
        }

        let origin = exchange.origin();
        let (mut conn, leftover) = exchange.hijack().await?;

        let now = Instant::now();
        if !self.transport.read_timeout.is_zero() {
            conn.set_read_deadline(Some(now + self.transport.read_timeout));
        }
        if !self.transport.write_timeout.is_zero() {
            conn.set_write_deadline(Some(now + self.transport.write_timeout));
        }

        self.origin = origin;
        self.leftover = leftover;
        self.conn = Some(conn);

        tracing::debug!(
            resource = self.transport.resource(),
            origin = self.origin.as_deref().unwrap_or(""),
            "exchange hijacked"
        );

        proceed();
        Ok(())
    }

    /// Read from the raw connection.
    ///
    /// Bytes the hijack had already buffered are served first. End-of-stream,
    /// short reads and deadline expiry pass through untranslated.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let conn = self.conn.as_mut().ok_or(TransportError::NotConnected)?;

        if !self.leftover.is_empty() {
            let n = self.leftover.len().min(buf.len());
            buf[..n].copy_from_slice(&self.leftover.split_to(n));
            return Ok(n);
        }

        Ok(conn.read(buf).await?)
    }

    /// Send the one outbound message of this exchange and close.
    ///
    /// Frames `payload` as a complete HTTP/1.0 response (echoing a non-empty
    /// request `Origin` as CORS headers) and writes the whole buffered
    /// response in one operation. The socket closes before returning whether
    /// or not the write succeeded; the close outcome is not reported.
    ///
    /// Returns the logical payload length, not the wire length.
    pub async fn write(&mut self, payload: &[u8]) -> Result<usize, TransportError> {
        let conn = self.conn.as_mut().ok_or(TransportError::NotConnected)?;

        let response = frame_response(payload, self.origin.as_deref());
        let result = conn.write_all(&response).await;

        // One outbound message per exchange: always terminal, even on a
        // failed write.
        let _ = self.close().await;

        result?;
        Ok(payload.len())
    }

    /// Release the connection and mark the socket unconnected.
    ///
    /// A second close reports `NotConnected` rather than succeeding silently.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        let mut conn = self.conn.take().ok_or(TransportError::NotConnected)?;
        self.leftover = Bytes::new();

        tracing::trace!(resource = self.transport.resource(), "socket closed");

        conn.shutdown().await?;
        Ok(())
    }
}

impl fmt::Display for XhrPollingSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.transport.resource())
    }
}

impl fmt::Debug for XhrPollingSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XhrPollingSocket")
            .field("resource", &self.transport.resource())
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Build the one-shot long-polling response, bit-for-bit:
///
/// ```text
/// HTTP/1.0 200 OK\r\n
/// Content-Type: text/plain; charset=UTF-8\r\n
/// Content-Length: <N>\r\n
/// [Access-Control-Allow-Origin: <origin>\r\n]
/// [Access-Control-Allow-Credentials: true\r\n]
/// \r\n
/// <payload bytes>
/// ```
///
/// `<N>` is the payload length alone. The CORS lines appear only for a
/// non-empty request origin, echoed verbatim.
fn frame_response(payload: &[u8], origin: Option<&str>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(payload.len() + 160);

    buf.extend_from_slice(b"HTTP/1.0 200 OK\r\n");
    buf.extend_from_slice(b"Content-Type: text/plain; charset=UTF-8\r\n");
    buf.extend_from_slice(format!("Content-Length: {}\r\n", payload.len()).as_bytes());

    if let Some(origin) = origin.filter(|o| !o.is_empty()) {
        buf.extend_from_slice(format!("Access-Control-Allow-Origin: {origin}\r\n").as_bytes());
        buf.extend_from_slice(b"Access-Control-Allow-Credentials: true\r\n");
    }

    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(payload);
    buf
}
