//! The inbound exchange capability consumed by the transport.
//!
//! An exchange is one HTTP request/response pair. The transport needs two
//! things from it: the inbound `Origin` header, and the ability to hijack it
//! away from the HTTP layer, taking exclusive ownership of the raw duplex
//! stream underneath. After a successful hijack the HTTP layer performs no
//! further reads, writes or response handling on that exchange.

use std::future::Future;
use std::io;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::net::conn::{BoxedConn, DeadlineStream};

/// One hijackable HTTP exchange.
pub trait Exchange: Send {
    /// Value of the inbound `Origin` header, if present.
    fn origin(&self) -> Option<String>;

    /// Detach and return the raw duplex stream, relinquishing all further
    /// HTTP-layer handling of this exchange. Also yields any inbound bytes
    /// that were buffered past the request head but not yet consumed.
    ///
    /// On failure the connection stays with the HTTP layer.
    fn hijack(self) -> impl Future<Output = io::Result<(BoxedConn, Bytes)>> + Send;
}

/// Exchange over an owned duplex stream.
///
/// Serves servers that parse HTTP themselves, and the test suite (over
/// `tokio::io::duplex`).
#[derive(Debug)]
pub struct StreamExchange<S> {
    stream: S,
    origin: Option<String>,
    leftover: Bytes,
}

impl<S> StreamExchange<S> {
    /// Exchange with no origin and no buffered bytes.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            origin: None,
            leftover: Bytes::new(),
        }
    }

    /// Set the inbound `Origin` header value.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set inbound bytes already read past the request head.
    pub fn with_leftover(mut self, leftover: Bytes) -> Self {
        self.leftover = leftover;
        self
    }
}

impl<S> Exchange for StreamExchange<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    fn origin(&self) -> Option<String> {
        self.origin.clone()
    }

    async fn hijack(self) -> io::Result<(BoxedConn, Bytes)> {
        Ok((Box::new(DeadlineStream::new(self.stream)), self.leftover))
    }
}
