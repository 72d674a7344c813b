//! Network capability subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound HTTP exchange
//!     → exchange.rs (Origin header, hijack: detach the raw stream)
//!     → conn.rs (deadline-capable owned duplex stream)
//!     → Hand off to the polling socket
//! ```
//!
//! # Design Decisions
//! - Hijacking is an explicit capability on the exchange type, not a
//!   downcast of a concrete connection
//! - Deadline support is provided by wrapping the detached stream, so the
//!   same socket logic runs over TCP, TLS or in-memory test streams

pub mod conn;
pub mod exchange;
pub mod upgrade;
