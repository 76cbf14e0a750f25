//! In-memory host store

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use dashmap::{DashMap, DashSet};
use gt_core::{HostObject, ObjectKind, ObjectPatch, StateCommon, StateId, StateRecord, Value};
use tokio::sync::broadcast;
use tracing::{debug, instrument, trace};

use crate::{StateHost, StoreError, StoreResult};

/// Default channel capacity for change subscriptions
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Origin recorded on writes made through the store
pub const DEFAULT_ORIGIN: &str = "system.adapter.javascript.0";

/// A state write as seen by subscribers
#[derive(Debug, Clone)]
pub struct StateChange {
    pub id: String,
    pub old_state: Option<StateRecord>,
    pub new_state: StateRecord,
}

/// The in-memory store tracks all objects and state values
///
/// The MemoryStateStore is responsible for:
/// - Storing objects and the current value of every state
/// - Broadcasting every state write to subscribers
/// - Counting writes and metadata patches so callers can assert on them
/// - Simulating host failures for individual ids or the whole store
pub struct MemoryStateStore {
    /// All objects keyed by id
    objects: DashMap<String, HostObject>,
    /// Current state values keyed by id
    states: DashMap<String, StateRecord>,
    /// Sender for state write notifications
    changes: broadcast::Sender<StateChange>,
    /// Number of state writes
    writes: AtomicU64,
    /// Number of object patches
    patches: AtomicU64,
    /// Ids whose every access fails
    failing: DashSet<String>,
    /// Whether every access fails
    unavailable: AtomicBool,
    /// Origin recorded on writes
    origin: String,
}

impl MemoryStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_origin(DEFAULT_ORIGIN)
    }

    /// Create an empty store that stamps writes with `origin`
    pub fn with_origin(origin: impl Into<String>) -> Self {
        let (changes, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            objects: DashMap::new(),
            states: DashMap::new(),
            changes,
            writes: AtomicU64::new(0),
            patches: AtomicU64::new(0),
            failing: DashSet::new(),
            unavailable: AtomicBool::new(false),
            origin: origin.into(),
        }
    }

    /// Subscribe to state writes
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    /// Make every access to `id` fail
    pub fn fail_on(&self, id: impl Into<String>) {
        self.failing.insert(id.into());
    }

    /// Stop failing accesses to `id`
    pub fn recover(&self, id: &str) {
        self.failing.remove(id);
    }

    /// Make every access fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Total number of state writes
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Total number of object patches
    pub fn patch_count(&self) -> u64 {
        self.patches.load(Ordering::SeqCst)
    }

    /// Number of objects of any kind
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Current value of a state, bypassing failure injection
    pub fn value(&self, id: &str) -> Option<Value> {
        self.states.get(id).map(|s| s.val.clone())
    }

    /// Current record of a state, bypassing failure injection
    pub fn record(&self, id: &str) -> Option<StateRecord> {
        self.states.get(id).map(|s| s.clone())
    }

    /// Object, bypassing failure injection
    pub fn object(&self, id: &str) -> Option<HostObject> {
        self.objects.get(id).map(|o| o.clone())
    }

    fn check(&self, id: &str) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        if self.failing.contains(id) {
            return Err(StoreError::Unavailable(format!("access to {} failed", id)));
        }
        id.parse::<StateId>()
            .map(|_| ())
            .map_err(|source| StoreError::InvalidId {
                id: id.to_string(),
                source,
            })
    }

    fn write(&self, id: &str, val: Value, ack: bool) {
        let old_state = self.states.get(id).map(|s| s.clone());
        let new_state = match &old_state {
            Some(existing) => existing.with_update(val, ack, self.origin.as_str()),
            None => StateRecord::new(val, ack, self.origin.as_str()),
        };

        debug!(
            val = %new_state.val,
            ack = new_state.ack,
            changed = new_state.lc == new_state.ts,
            "Setting state"
        );

        self.states.insert(id.to_string(), new_state.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        // No subscribers is fine
        let _ = self.changes.send(StateChange {
            id: id.to_string(),
            old_state,
            new_state,
        });
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHost for MemoryStateStore {
    fn exists_state(&self, id: &str) -> StoreResult<bool> {
        self.check(id)?;
        Ok(self
            .objects
            .get(id)
            .map(|o| o.kind == ObjectKind::State)
            .unwrap_or(false))
    }

    fn get_state(&self, id: &str) -> StoreResult<Option<StateRecord>> {
        self.check(id)?;
        Ok(self.states.get(id).map(|s| s.clone()))
    }

    #[instrument(skip(self, val), fields(id = %id))]
    fn set_state(&self, id: &str, val: Value, ack: bool) -> StoreResult<()> {
        self.check(id)?;
        match self.objects.get(id).map(|o| o.kind) {
            Some(ObjectKind::State) => {}
            Some(kind) => {
                return Err(StoreError::Rejected {
                    id: id.to_string(),
                    reason: format!("object is a {:?}, not a state", kind),
                })
            }
            None => return Err(StoreError::NotFound(id.to_string())),
        }
        self.write(id, val, ack);
        Ok(())
    }

    #[instrument(skip(self, initial, common), fields(id = %id))]
    fn create_state(&self, id: &str, initial: Value, common: StateCommon) -> StoreResult<()> {
        self.check(id)?;
        if self.objects.contains_key(id) {
            trace!("State already exists");
            return Ok(());
        }
        self.objects
            .insert(id.to_string(), HostObject::state(common));
        self.write(id, initial, true);
        Ok(())
    }

    fn exists_object(&self, id: &str) -> StoreResult<bool> {
        self.check(id)?;
        Ok(self.objects.contains_key(id))
    }

    fn get_object(&self, id: &str) -> StoreResult<Option<HostObject>> {
        self.check(id)?;
        Ok(self.objects.get(id).map(|o| o.clone()))
    }

    #[instrument(skip(self, obj), fields(id = %id))]
    fn set_object(&self, id: &str, obj: HostObject) -> StoreResult<()> {
        self.check(id)?;
        debug!(kind = ?obj.kind, "Setting object");
        self.objects.insert(id.to_string(), obj);
        Ok(())
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    fn extend_object(&self, id: &str, patch: ObjectPatch) -> StoreResult<()> {
        self.check(id)?;
        let mut obj = self
            .objects
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(common) = patch.common {
            obj.common = common;
        }
        if let Some(native) = patch.native {
            obj.native.extend(native);
        }
        self.patches.fetch_add(1, Ordering::SeqCst);
        debug!("Extended object");
        Ok(())
    }
}
