//! Host state/object store interface
//!
//! Scripts never own their storage: the automation host keeps every state
//! and object and exposes a handful of primitives to read, write, create
//! and extend them. This crate defines those primitives as the
//! [`StateHost`] trait and ships [`MemoryStateStore`], an in-memory host
//! used for tests and local runs.

mod memory;

use async_trait::async_trait;
use gt_core::{HostObject, ObjectPatch, StateCommon, StateIdError, StateRecord, Value};
use thiserror::Error;

pub use memory::{MemoryStateStore, StateChange, DEFAULT_ORIGIN};

/// Host store errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid id '{id}': {source}")]
    InvalidId {
        id: String,
        #[source]
        source: StateIdError,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("write rejected for {id}: {reason}")]
    Rejected { id: String, reason: String },
}

/// Result type for host store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Primitives offered by the automation host
///
/// The synchronous methods mirror the host's cached, immediate calls. The
/// asynchronous ones go through the host's storage layer and suspend until
/// it answers; by default they delegate to their synchronous counterparts.
#[async_trait]
pub trait StateHost: Send + Sync {
    /// Whether a state object exists for `id`
    fn exists_state(&self, id: &str) -> StoreResult<bool>;

    /// Current value record, None if the state has no value yet
    fn get_state(&self, id: &str) -> StoreResult<Option<StateRecord>>;

    /// Write a value
    fn set_state(&self, id: &str, val: Value, ack: bool) -> StoreResult<()>;

    /// Create a state object with metadata and an initial value
    fn create_state(&self, id: &str, initial: Value, common: StateCommon) -> StoreResult<()>;

    /// Whether any object exists for `id`
    fn exists_object(&self, id: &str) -> StoreResult<bool>;

    fn get_object(&self, id: &str) -> StoreResult<Option<HostObject>>;

    /// Create or replace an object
    fn set_object(&self, id: &str, obj: HostObject) -> StoreResult<()>;

    /// Merge a patch into an existing object
    fn extend_object(&self, id: &str, patch: ObjectPatch) -> StoreResult<()>;

    async fn get_object_async(&self, id: &str) -> StoreResult<Option<HostObject>> {
        self.get_object(id)
    }

    async fn set_object_async(&self, id: &str, obj: HostObject) -> StoreResult<()> {
        self.set_object(id, obj)
    }

    async fn extend_object_async(&self, id: &str, patch: ObjectPatch) -> StoreResult<()> {
        self.extend_object(id, patch)
    }

    async fn set_state_async(&self, id: &str, val: Value, ack: bool) -> StoreResult<()> {
        self.set_state(id, val, ack)
    }
}
