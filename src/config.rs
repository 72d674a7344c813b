//! Transport configuration schema.
//!
//! Deadlines are fixed at server startup and shared by every socket a
//! transport descriptor creates. A value of `0` disables the corresponding
//! deadline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Liveness deadlines applied to each hijacked connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeadlineConfig {
    /// Period during which the client must send a message (ms, 0 = none).
    pub read_timeout_ms: u64,

    /// Period during which a write must succeed (ms, 0 = none).
    pub write_timeout_ms: u64,
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }
}

impl DeadlineConfig {
    /// Read deadline as a duration.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Write deadline as a duration.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}
