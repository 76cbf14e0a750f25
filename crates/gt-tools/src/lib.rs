//! Helpers for home-automation scripts
//!
//! This crate bundles the functions every automation script needs when it
//! talks to a host state store:
//!
//! - Making sure states and channels exist with the right metadata
//! - Reading states with fallbacks and writing only on change
//! - Formatting numbers, sizes, power, durations and dates
//! - Script heartbeats and chat notifications driven by trigger states
//!
//! State-bound helpers live on [`GlobalTools`]; the pure ones are plain
//! functions. Nothing here returns an error to the caller. Host failures are
//! logged and reported to a [`DiagnosticSink`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use gt_state_store::MemoryStateStore;
//! use gt_tools::{fmt_watt, GlobalTools};
//!
//! let tools = GlobalTools::new(Arc::new(MemoryStateStore::new()));
//! let power = tools.get_num("shelly.0.plug.power", 0.0);
//! tools.notify_syno_chat(None, &format!("Washer draws {}", fmt_watt(power, 1)));
//! tools.hb_ok("washer", Some("checked"));
//! ```

pub mod array;
pub mod config;
pub mod datetime;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod heartbeat;
pub mod html;
pub mod json;
pub mod logging;
pub mod notify;
pub mod state;
mod tools;

pub use array::{delete_duplicate_values, delete_duplicates};
pub use config::ToolsConfig;
pub use datetime::{
    days_between, gt_date, gt_time, is_same_day, start_of_day, DateVariant, TimeVariant,
};
pub use diagnostics::{Diagnostic, DiagnosticEntry, DiagnosticLog, DiagnosticSink, NullSink};
pub use error::{ConfigError, ConfigResult};
pub use format::{
    fmt_bytes, fmt_date_time, fmt_duration, fmt_num, fmt_num_or, fmt_percent, fmt_watt,
};
pub use heartbeat::HeartbeatIds;
pub use html::{escape_html, escape_html_value};
pub use json::{json_parse, json_stringify};
pub use logging::{LogLevel, Logger};
pub use notify::ChatChannelIds;
pub use state::{EnsureState, TypedState};
pub use tools::GlobalTools;
