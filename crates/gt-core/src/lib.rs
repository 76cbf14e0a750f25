//! Core types for global tools
//!
//! This crate provides the fundamental types shared by the host store and
//! the script helpers: StateId, StateRecord, the object metadata types and
//! the loose value coercions scripts rely on.

mod id;
mod object;
mod state;
pub mod value;

pub use id::{last_segment, StateId, StateIdError};
pub use object::{Access, HostObject, ObjectKind, ObjectPatch, StateCommon, ValueType};
pub use state::{now_millis, StateRecord};

// Re-export serde_json::Value, the value type of every state
pub use serde_json::Value;
