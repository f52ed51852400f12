//! Server-assigned timestamps

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A server-assigned timestamp in milliseconds since the Unix epoch.
///
/// Timestamps are totally ordered and, within one backend, strictly monotonic
/// across writes: two messages appended to the same store never share a
/// timestamp. Equality of `last_message_at` values is therefore a reliable
/// way to check that a conversation summary still refers to the same message.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The zero timestamp (Unix epoch), used for records that have no
    /// meaningful time yet.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Create a timestamp from milliseconds since the Unix epoch
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds since the Unix epoch
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// The current wall-clock time.
    ///
    /// Backends use this as the base for their monotonic server clock; it is
    /// not itself guaranteed monotonic.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self(millis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(millis: u64) -> Self {
        Self(millis)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}
