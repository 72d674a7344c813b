//! Transport error taxonomy.
//!
//! All errors are returned synchronously to the caller; nothing is retried
//! or swallowed inside the transport. Retries, if any, belong to the session
//! layer above.

use thiserror::Error;

/// Errors surfaced by the polling socket lifecycle and I/O paths.
#[derive(Debug, Error)]
pub enum TransportError {
    /// `accept` was called on a socket that already holds a live connection.
    #[error("socket already connected")]
    AlreadyConnected,

    /// `read`, `write` or `close` was called while the socket holds no
    /// connection. Indicates lifecycle misuse by the caller.
    #[error("socket not connected")]
    NotConnected,

    /// Hijack or I/O failure on the underlying connection, including
    /// deadline expiry. Propagated unchanged.
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),
}
