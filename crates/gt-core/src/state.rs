//! State record representing the current value of a state

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::loosely_equal;

/// Represents the value of a state at a point in time
///
/// Timestamps are milliseconds since the UNIX epoch, the unit the host uses
/// for `ts`/`lc` on every state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRecord {
    /// The current value
    pub val: Value,

    /// Whether the value is confirmed (true) or a command still to act on (false)
    pub ack: bool,

    /// When the state was last written
    pub ts: i64,

    /// When the value last changed
    pub lc: i64,

    /// Origin of the last write
    #[serde(default)]
    pub from: String,
}

impl StateRecord {
    /// Create a new record stamped with the current time
    pub fn new(val: Value, ack: bool, from: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            val,
            ack,
            ts: now,
            lc: now,
            from: from.into(),
        }
    }

    /// Synthetic record used when a state is missing or unreadable
    pub fn fallback(val: Value) -> Self {
        Self {
            val,
            ack: true,
            ts: 0,
            lc: 0,
            from: String::new(),
        }
    }

    /// Create an updated record, preserving `lc` if the value is the same
    pub fn with_update(&self, val: Value, ack: bool, from: impl Into<String>) -> Self {
        let now = now_millis();
        let changed = !loosely_equal(&self.val, &val);
        Self {
            val,
            ack,
            ts: now,
            lc: if changed { now } else { self.lc },
            from: from.into(),
        }
    }

    /// Whether this record was synthesised rather than read from the host
    pub fn is_synthetic(&self) -> bool {
        self.ts == 0
    }
}

impl PartialEq for StateRecord {
    fn eq(&self, other: &Self) -> bool {
        // Timestamps and origin are not compared
        self.val == other.val && self.ack == other.ack
    }
}

/// Current wall-clock time in milliseconds since the UNIX epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
