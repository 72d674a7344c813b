//! Deadline-capable raw connections.
//!
//! A hijack yields exclusive ownership of a duplex byte stream. The socket
//! needs one extra capability on top of `AsyncRead + AsyncWrite`: absolute
//! expiry deadlines per direction. `DeadlineStream` supplies that capability
//! for any stream, so deadline support is a wrapper rather than a hard
//! dependency on one concrete transport type.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::{sleep_until, Instant, Sleep};

/// A raw duplex connection with optional per-direction deadlines.
///
/// A deadline is an absolute point in time after which pending and future
/// I/O in that direction fails with `io::ErrorKind::TimedOut`.
pub trait RawConn: AsyncRead + AsyncWrite + Send + Unpin {
    /// Arm or clear the read deadline.
    fn set_read_deadline(&mut self, deadline: Option<Instant>);

    /// Arm or clear the write deadline.
    fn set_write_deadline(&mut self, deadline: Option<Instant>);
}

/// Owned connection handle produced by a hijack.
pub type BoxedConn = Box<dyn RawConn>;

/// Wraps any duplex stream with absolute read/write deadlines.
#[derive(Debug)]
pub struct DeadlineStream<S> {
    inner: S,
    read_expiry: Option<Pin<Box<Sleep>>>,
    write_expiry: Option<Pin<Box<Sleep>>>,
}

impl<S> DeadlineStream<S> {
    /// Wrap a stream with no deadlines armed.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            read_expiry: None,
            write_expiry: None,
        }
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: AsyncRead + AsyncWrite + Send + Unpin> RawConn for DeadlineStream<S> {
    fn set_read_deadline(&mut self, deadline: Option<Instant>) {
        self.read_expiry = deadline.map(|at| Box::pin(sleep_until(at)));
    }

    fn set_write_deadline(&mut self, deadline: Option<Instant>) {
        self.write_expiry = deadline.map(|at| Box::pin(sleep_until(at)));
    }
}

fn expired(expiry: &mut Option<Pin<Box<Sleep>>>, cx: &mut Context<'_>) -> bool {
    match expiry {
        Some(sleep) => sleep.as_mut().poll(cx).is_ready(),
        None => false,
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for DeadlineStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if expired(&mut this.read_expiry, cx) {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "read deadline elapsed",
            )));
        }
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for DeadlineStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if expired(&mut this.write_expiry, cx) {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "write deadline elapsed",
            )));
        }
        Pin::new(&mut this.inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if expired(&mut this.write_expiry, cx) {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "write deadline elapsed",
            )));
        }
        Pin::new(&mut this.inner).poll_flush(cx)
    }

    // Shutdown is how the socket releases the connection; it must not be
    // blocked by an elapsed write deadline.
    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
