//! Hyper-backed exchange adapter.
//!
//! Hyper owns its connections; the supported takeover path is the upgrade
//! mechanism. The adapter pulls `OnUpgrade` out of the request extensions at
//! construction time and resolves it at hijack time, yielding the raw stream
//! wrapped with deadline support.

use std::io;

use bytes::Bytes;
use http::header::ORIGIN;
use http::request::Parts;
use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;

use crate::error::TransportError;
use crate::net::conn::{BoxedConn, DeadlineStream};
use crate::net::exchange::Exchange;

/// Exchange over a hyper-served request.
#[derive(Debug)]
pub struct HyperExchange {
    origin: Option<String>,
    on_upgrade: OnUpgrade,
}

impl HyperExchange {
    /// Capture the `Origin` header and the connection takeover handle from
    /// the request head.
    ///
    /// Fails when the underlying connection cannot be taken over (already
    /// taken, or the server build does not support upgrades).
    pub fn from_parts(parts: &mut Parts) -> Result<Self, TransportError> {
        let on_upgrade = parts
            .extensions
            .remove::<OnUpgrade>()
            .ok_or_else(|| {
                TransportError::Io(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "connection does not support takeover",
                ))
            })?;

        let origin = parts
            .headers
            .get(ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Ok(Self { origin, on_upgrade })
    }
}

impl Exchange for HyperExchange {
    fn origin(&self) -> Option<String> {
        self.origin.clone()
    }

    async fn hijack(self) -> io::Result<(BoxedConn, Bytes)> {
        let upgraded = self.on_upgrade.await.map_err(io::Error::other)?;
        // Bytes hyper buffered past the request head are replayed by
        // `Upgraded` itself on read.
        let conn = DeadlineStream::new(TokioIo::new(upgraded));
        Ok((Box::new(conn), Bytes::new()))
    }
}
