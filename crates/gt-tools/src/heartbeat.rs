//! Script heartbeats
//!
//! Each script key owns three states below the configured heartbeat root:
//! `lastPing` (ms timestamp), `status` (`init`/`ok`/`error`) and
//! `lastMessage`. All three are read-only for users and written with
//! `ack = true`.

use gt_core::{now_millis, Access, StateCommon, StateIdError, Value, ValueType};
use gt_state_store::{StateHost, StoreResult};
use serde_json::json;

use crate::tools::GlobalTools;

pub const STATUS_INIT: &str = "init";
pub const STATUS_OK: &str = "ok";
pub const STATUS_ERROR: &str = "error";

/// Ids of one script's heartbeat states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatIds {
    pub last_ping: String,
    pub status: String,
    pub last_message: String,
}

impl<H: StateHost> GlobalTools<H> {
    /// Heartbeat state ids for `key` below the configured root
    pub fn heartbeat_ids(&self, key: &str) -> Result<HeartbeatIds, StateIdError> {
        let root = &self.config.heartbeat_root;
        Ok(HeartbeatIds {
            last_ping: Self::child_id(root, &format!("{}.lastPing", key))?,
            status: Self::child_id(root, &format!("{}.status", key))?,
            last_message: Self::child_id(root, &format!("{}.lastMessage", key))?,
        })
    }

    /// Create the heartbeat states for `key` if they are missing
    pub fn hb_ensure(&self, key: &str) {
        match self.heartbeat_ids(key) {
            Ok(ids) => self.ensure_heartbeat_states(key, &ids),
            Err(e) => self.warn("hb_ensure", key, &e),
        }
    }

    fn ensure_heartbeat_states(&self, key: &str, ids: &HeartbeatIds) {
        let read_only = |name: String, role: &str, value_type: ValueType| {
            StateCommon::state(name, role, value_type, Access::ReadOnly)
        };
        self.ensure_state_legacy(
            &ids.last_ping,
            Some(read_only(format!("Last ping {}", key), "value.time", ValueType::Number)),
            json!(0),
        );
        self.ensure_state_legacy(
            &ids.status,
            Some(read_only(format!("Status {}", key), "text", ValueType::String)),
            json!(STATUS_INIT),
        );
        self.ensure_state_legacy(
            &ids.last_message,
            Some(read_only(format!("Last message {}", key), "text", ValueType::String)),
            json!(""),
        );
    }

    /// Record a heartbeat: ping time, status and optionally a message
    ///
    /// The previous message is kept when none is given.
    pub fn heartbeat(&self, key: &str, ok: bool, message: Option<&str>) {
        let ids = match self.heartbeat_ids(key) {
            Ok(ids) => ids,
            Err(e) => {
                self.warn("heartbeat", key, &e);
                return;
            }
        };
        self.ensure_heartbeat_states(key, &ids);
        if let Err(e) = self.write_heartbeat(&ids, ok, message) {
            self.warn("heartbeat", key, &e);
        }
    }

    fn write_heartbeat(&self, ids: &HeartbeatIds, ok: bool, message: Option<&str>) -> StoreResult<()> {
        let status = if ok { STATUS_OK } else { STATUS_ERROR };
        self.host
            .set_state(&ids.last_ping, Value::from(now_millis()), true)?;
        self.host.set_state(&ids.status, json!(status), true)?;
        if let Some(message) = message {
            self.host.set_state(&ids.last_message, json!(message), true)?;
        }
        Ok(())
    }

    /// Heartbeat with status `ok`
    pub fn hb_ok(&self, key: &str, message: Option<&str>) {
        self.heartbeat(key, true, message);
    }

    /// Heartbeat with status `error`
    pub fn hb_error(&self, key: &str, message: Option<&str>) {
        self.heartbeat(key, false, message);
    }
}
