//! Transport descriptor subsystem.
//!
//! # Data Flow
//! ```text
//! Routing layer selects a transport by resource name
//!     → descriptor creates a fresh socket per inbound request
//!     → socket hijacks the exchange (net subsystem)
//!     → session layer reads/writes until the exchange completes
//! ```

pub mod xhr_polling;

use std::sync::Arc;

/// A pluggable binding mapping the protocol's duplex-stream contract onto a
/// specific wire mechanism.
pub trait Transport: Send + Sync {
    /// Socket type produced for each inbound request.
    type Socket;

    /// Fixed identifier the routing layer uses to select this transport.
    fn resource(&self) -> &'static str;

    /// Fresh, unconnected socket bound to this descriptor's deadline policy.
    /// Pure, never fails.
    fn new_socket(self: &Arc<Self>) -> Self::Socket;
}

pub use xhr_polling::{XhrPollingSocket, XhrPollingTransport};
