//! Long-polling (xhr-polling) transport binding.
//!
//! Multiplexes a logical persistent connection over a sequence of short-lived
//! HTTP exchanges. Each inbound request is hijacked away from the HTTP layer
//! and driven as a one-shot duplex byte stream: the session layer reads the
//! request body bytes, writes at most one outbound message, and the socket
//! frames that message as a complete HTTP/1.0 response and closes.

pub mod config;
pub mod error;
pub mod net;
pub mod transport;

pub use config::DeadlineConfig;
pub use error::TransportError;
pub use net::conn::{BoxedConn, DeadlineStream, RawConn};
pub use net::exchange::{Exchange, StreamExchange};
pub use net::upgrade::HyperExchange;
pub use transport::{Transport, XhrPollingSocket, XhrPollingTransport};
