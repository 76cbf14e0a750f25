//! State helpers: ensure existence and shape, safe reads, guarded writes

use gt_core::value::{loosely_equal, to_display_string, to_number};
use gt_core::{
    last_segment, Access, HostObject, ObjectPatch, StateCommon, StateRecord, Value, ValueType,
};
use gt_state_store::{StateHost, StoreResult};
use tracing::debug;

use crate::tools::GlobalTools;

/// Acknowledgement flag used when a caller does not pick one
pub const DEFAULT_ACK: bool = true;

/// Desired shape of a state for [`GlobalTools::ensure_state_typed`]
#[derive(Debug, Clone, PartialEq)]
pub struct TypedState {
    /// Written once when the state is created
    pub default: Option<Value>,
    pub role: String,
    pub value_type: ValueType,
    pub access: Access,
}

impl TypedState {
    pub fn new(role: impl Into<String>, value_type: ValueType, access: Access) -> Self {
        Self {
            default: None,
            role: role.into(),
            value_type,
            access,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// How [`GlobalTools::ensure_state`] should make sure a state exists
#[derive(Debug, Clone, PartialEq)]
pub enum EnsureState {
    /// Create with the given metadata if missing; never touch an existing state
    Legacy {
        common: Option<StateCommon>,
        initial: Value,
    },
    /// Create if missing, otherwise reconcile role/type/read/write
    Typed(TypedState),
}

/// What a typed ensure did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconciled {
    Created,
    Patched,
    Unchanged,
}

impl<H: StateHost> GlobalTools<H> {
    /// Create a channel object unless an object with that id exists
    pub fn ensure_channel(&self, id: &str, common: Option<StateCommon>) {
        let result = self.host.exists_object(id).and_then(|exists| {
            if exists {
                return Ok(());
            }
            let common = common.unwrap_or_else(|| StateCommon::named(id));
            self.host.set_object(id, HostObject::channel(common))
        });
        if let Err(e) = result {
            self.warn("ensure_channel", id, &e);
        }
    }

    /// Create a state with metadata and initial value unless it exists
    ///
    /// Without metadata a generic read/write `mixed` descriptor named after
    /// the full id is used. An existing state is left alone, even if its
    /// metadata differs.
    pub fn ensure_state_legacy(&self, id: &str, common: Option<StateCommon>, initial: Value) {
        let result = self.host.exists_state(id).and_then(|exists| {
            if exists {
                return Ok(());
            }
            let common = common.unwrap_or_else(|| StateCommon::mixed(id));
            self.host.create_state(id, initial, common)
        });
        if let Err(e) = result {
            self.warn("ensure_state_legacy", id, &e);
        }
    }

    /// Create a state or reconcile its role, type and read/write flags
    ///
    /// A new state is named after the last id segment and, if a default is
    /// given, initialised with it. An existing state only gets a metadata
    /// patch when its shape differs; its value is never touched.
    pub async fn ensure_state_typed(&self, id: &str, desired: TypedState) {
        match self.reconcile_state(id, &desired).await {
            Ok(outcome) => debug!(id, ?outcome, "Ensured state"),
            Err(e) => self.warn("ensure_state_typed", id, &e),
        }
    }

    /// Ensure a state using an explicitly chosen strategy
    pub async fn ensure_state(&self, id: &str, desired: EnsureState) {
        match desired {
            EnsureState::Legacy { common, initial } => {
                self.ensure_state_legacy(id, common, initial)
            }
            EnsureState::Typed(desired) => self.ensure_state_typed(id, desired).await,
        }
    }

    async fn reconcile_state(&self, id: &str, desired: &TypedState) -> StoreResult<Reconciled> {
        let Some(existing) = self.host.get_object_async(id).await? else {
            let mut common = StateCommon::state(
                last_segment(id),
                &desired.role,
                desired.value_type,
                desired.access,
            );
            common.def = desired.default.clone();
            self.host
                .set_object_async(id, HostObject::state(common))
                .await?;
            if let Some(default) = &desired.default {
                self.host.set_state_async(id, default.clone(), true).await?;
            }
            return Ok(Reconciled::Created);
        };

        if existing
            .common
            .has_shape(&desired.role, desired.value_type, desired.access)
        {
            return Ok(Reconciled::Unchanged);
        }

        let patch = ObjectPatch {
            common: Some(
                existing
                    .common
                    .reshaped(&desired.role, desired.value_type, desired.access),
            ),
            native: None,
        };
        self.host.extend_object_async(id, patch).await?;
        Ok(Reconciled::Patched)
    }

    /// Read a state, or a synthetic record carrying `fallback`
    ///
    /// The synthetic record has `ts = lc = 0` and `ack = true`. Missing
    /// states and host errors both produce it.
    pub fn get_safe_state(&self, id: &str, fallback: Value) -> StateRecord {
        self.read_record(id)
            .unwrap_or_else(|| StateRecord::fallback(fallback))
    }

    /// Read a state as a number; unreadable or non-numeric values give `fallback`
    pub fn get_num(&self, id: &str, fallback: f64) -> f64 {
        let n = self
            .read_record(id)
            .map(|record| to_number(&record.val))
            .unwrap_or(fallback);
        if n.is_nan() {
            fallback
        } else {
            n
        }
    }

    /// Read a state as a boolean
    ///
    /// Accepts booleans, the strings `"true"`/`"false"` and numbers (non-zero
    /// is true); anything else gives `fallback`.
    pub fn get_bool(&self, id: &str, fallback: bool) -> bool {
        match self.read_record(id).map(|record| record.val) {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) if s == "true" => true,
            Some(Value::String(s)) if s == "false" => false,
            Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(fallback),
            _ => fallback,
        }
    }

    /// Read a state as a string; null or unreadable values give `fallback`
    pub fn get_str(&self, id: &str, fallback: &str) -> String {
        match self.read_record(id).map(|record| record.val) {
            None | Some(Value::Null) => fallback.to_string(),
            Some(val) => to_display_string(&val),
        }
    }

    fn read_record(&self, id: &str) -> Option<StateRecord> {
        let result = self.host.exists_state(id).and_then(|exists| {
            if exists {
                self.host.get_state(id)
            } else {
                Ok(None)
            }
        });
        match result {
            Ok(record) => record,
            Err(e) => {
                self.warn("get_safe_state", id, &e);
                None
            }
        }
    }

    /// Write with `ack = true` only if the value differs from the current one
    pub fn set_state_if_changed(&self, id: &str, val: impl Into<Value>) -> bool {
        self.set_state_if_changed_with_ack(id, val, DEFAULT_ACK)
    }

    /// Write only if the value differs from the current one
    ///
    /// Returns true if a write happened. Primitives compare by value (`1`
    /// equals `1.0`); arrays and objects always count as changed. When the
    /// current value cannot be read the write is attempted anyway.
    pub fn set_state_if_changed_with_ack(&self, id: &str, val: impl Into<Value>, ack: bool) -> bool {
        let val = val.into();
        match self.host.get_state(id) {
            Ok(Some(current)) if loosely_equal(&current.val, &val) => return false,
            Ok(_) => {}
            Err(e) => self.warn("set_state_if_changed", id, &e),
        }
        match self.host.set_state(id, val, ack) {
            Ok(()) => true,
            Err(e) => {
                self.warn("set_state_if_changed", id, &e);
                false
            }
        }
    }

    /// Write a value, creating the state first if it is missing and metadata is given
    pub fn set_state_safe(
        &self,
        id: &str,
        val: impl Into<Value>,
        ack: bool,
        common_if_missing: Option<StateCommon>,
        default_if_missing: Value,
    ) {
        let result = self.host.exists_state(id).and_then(|exists| {
            if !exists {
                if let Some(common) = common_if_missing {
                    self.ensure_state_legacy(id, Some(common), default_if_missing);
                }
            }
            self.host.set_state(id, val.into(), ack)
        });
        if let Err(e) = result {
            self.warn("set_state_safe", id, &e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gt_state_store::MemoryStateStore;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryStateStore>, GlobalTools<MemoryStateStore>) {
        let store = Arc::new(MemoryStateStore::new());
        let tools = GlobalTools::new(store.clone());
        (store, tools)
    }

    fn text(name: &str) -> StateCommon {
        StateCommon::state(name, "text", ValueType::String, Access::ReadWrite)
    }

    #[test]
    fn test_ensure_channel() {
        let (store, tools) = setup();
        tools.ensure_channel("0_userdata.0.Geraete.SynoPhoto", None);

        let obj = store.object("0_userdata.0.Geraete.SynoPhoto").unwrap();
        assert_eq!(obj.kind, gt_core::ObjectKind::Channel);
        assert_eq!(obj.common.name, "0_userdata.0.Geraete.SynoPhoto");

        // Existing objects are left alone
        tools.ensure_channel(
            "0_userdata.0.Geraete.SynoPhoto",
            Some(StateCommon::named("renamed")),
        );
        let obj = store.object("0_userdata.0.Geraete.SynoPhoto").unwrap();
        assert_eq!(obj.common.name, "0_userdata.0.Geraete.SynoPhoto");
    }

    #[test]
    fn test_ensure_state_legacy_defaults_to_mixed() {
        let (store, tools) = setup();
        tools.ensure_state_legacy("0_userdata.0.counter", None, json!(0));

        let obj = store.object("0_userdata.0.counter").unwrap();
        assert_eq!(obj.common.name, "0_userdata.0.counter");
        assert_eq!(obj.common.value_type, Some(ValueType::Mixed));
        assert_eq!(obj.common.role.as_deref(), Some("state"));
        assert_eq!(obj.common.write, Some(true));
        assert_eq!(store.value("0_userdata.0.counter"), Some(json!(0)));
    }

    #[test]
    fn test_ensure_state_legacy_is_noop_when_present() {
        let (store, tools) = setup();
        tools.ensure_state_legacy("a.b", Some(text("first")), json!("x"));
        store.set_state("a.b", json!("changed"), true).unwrap();

        tools.ensure_state_legacy("a.b", Some(text("second")), json!("y"));
        assert_eq!(store.value("a.b"), Some(json!("changed")));
        assert_eq!(store.object("a.b").unwrap().common.name, "first");
    }

    #[test]
    fn test_get_safe_state_fallback() {
        let (_, tools) = setup();
        let record = tools.get_safe_state("a.missing", json!("fb"));
        assert_eq!(record.val, json!("fb"));
        assert_eq!(record.ts, 0);
        assert!(record.ack);
        assert!(tools.diagnostics().is_empty());
    }

    #[test]
    fn test_get_safe_state_store_error_is_warned() {
        let (store, tools) = setup();
        tools.ensure_state_legacy("a.b", Some(text("b")), json!("real"));
        store.fail_on("a.b");

        let record = tools.get_safe_state("a.b", json!("fb"));
        assert_eq!(record.val, json!("fb"));
        let diagnostics = tools.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].function, "get_safe_state");
        assert_eq!(diagnostics[0].id, "a.b");
    }

    #[test]
    fn test_get_num() {
        let (store, tools) = setup();
        tools.ensure_state_legacy("a.num", None, json!("21.5"));
        tools.ensure_state_legacy("a.text", None, json!("warm"));
        tools.ensure_state_legacy("a.null", None, json!(null));

        assert_eq!(tools.get_num("a.num", 0.0), 21.5);
        assert_eq!(tools.get_num("a.text", -1.0), -1.0);
        assert_eq!(tools.get_num("a.null", -1.0), 0.0);
        assert_eq!(tools.get_num("a.missing", 7.0), 7.0);

        store.set_state("a.num", json!(true), true).unwrap();
        assert_eq!(tools.get_num("a.num", 0.0), 1.0);
    }

    #[test]
    fn test_get_bool() {
        let (store, tools) = setup();
        tools.ensure_state_legacy("a.flag", None, json!("false"));
        assert!(!tools.get_bool("a.flag", true));

        store.set_state("a.flag", json!("true"), true).unwrap();
        assert!(tools.get_bool("a.flag", false));

        store.set_state("a.flag", json!(0), true).unwrap();
        assert!(!tools.get_bool("a.flag", true));

        store.set_state("a.flag", json!(5), true).unwrap();
        assert!(tools.get_bool("a.flag", false));

        store.set_state("a.flag", json!("yes"), true).unwrap();
        assert!(tools.get_bool("a.flag", true));
        assert!(!tools.get_bool("a.flag", false));

        assert!(tools.get_bool("a.missing", true));
        assert!(!tools.get_bool("a.missing", false));
    }

    #[test]
    fn test_get_str() {
        let (store, tools) = setup();
        tools.ensure_state_legacy("a.s", None, json!(12.0));
        assert_eq!(tools.get_str("a.s", "fb"), "12");

        store.set_state("a.s", json!(null), true).unwrap();
        assert_eq!(tools.get_str("a.s", "fb"), "fb");

        store.set_state("a.s", json!(false), true).unwrap();
        assert_eq!(tools.get_str("a.s", "fb"), "false");

        assert_eq!(tools.get_str("a.missing", "fb"), "fb");
    }

    #[test]
    fn test_set_state_if_changed() {
        let (store, tools) = setup();
        tools.ensure_state_legacy("a.b", None, json!(1));
        let writes = store.write_count();

        assert!(!tools.set_state_if_changed("a.b", 1.0));
        assert_eq!(store.write_count(), writes);

        assert!(tools.set_state_if_changed("a.b", 2));
        assert_eq!(store.write_count(), writes + 1);
        assert!(store.record("a.b").unwrap().ack);

        assert!(tools.set_state_if_changed_with_ack("a.b", "cmd", false));
        assert!(!store.record("a.b").unwrap().ack);
    }

    #[test]
    fn test_set_state_if_changed_composites_always_write() {
        let (store, tools) = setup();
        tools.ensure_state_legacy("a.list", None, json!([1, 2]));
        let writes = store.write_count();

        assert!(tools.set_state_if_changed("a.list", json!([1, 2])));
        assert_eq!(store.write_count(), writes + 1);
    }

    #[test]
    fn test_set_state_if_changed_read_and_write_failure() {
        let (store, tools) = setup();
        tools.ensure_state_legacy("a.b", None, json!(1));
        store.set_unavailable(true);

        // Neither read nor write succeeds
        assert!(!tools.set_state_if_changed("a.b", 1));
        let diagnostics = tools.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].function, "set_state_if_changed");
        assert_eq!(diagnostics[0].count, 2);

        store.set_unavailable(false);
        assert!(!tools.set_state_if_changed("a.missing", 1));
    }

    #[test]
    fn test_set_state_safe_creates_when_metadata_given() {
        let (store, tools) = setup();
        tools.set_state_safe("a.created", "hello", true, Some(text("created")), json!(""));
        assert_eq!(store.value("a.created"), Some(json!("hello")));
        assert_eq!(store.object("a.created").unwrap().common.name, "created");
    }

    #[test]
    fn test_set_state_safe_without_metadata_warns() {
        let (store, tools) = setup();
        tools.set_state_safe("a.unknown", 1, true, None, json!(null));
        assert!(store.value("a.unknown").is_none());

        let diagnostics = tools.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].function, "set_state_safe");
    }

    #[tokio::test]
    async fn test_ensure_state_typed_creates() {
        let (store, tools) = setup();
        let desired = TypedState::new("value.temperature", ValueType::Number, Access::ReadOnly)
            .with_default(20);
        tools
            .ensure_state_typed("0_userdata.0.Klima.temp", desired)
            .await;

        let obj = store.object("0_userdata.0.Klima.temp").unwrap();
        assert_eq!(obj.common.name, "temp");
        assert_eq!(obj.common.def, Some(json!(20)));
        assert_eq!(obj.common.write, Some(false));
        assert_eq!(obj.common.read, Some(true));
        let record = store.record("0_userdata.0.Klima.temp").unwrap();
        assert_eq!(record.val, json!(20));
        assert!(record.ack);
    }

    #[tokio::test]
    async fn test_ensure_state_typed_without_default_writes_nothing() {
        let (store, tools) = setup();
        tools
            .ensure_state_typed("a.b", TypedState::new("text", ValueType::String, Access::ReadWrite))
            .await;
        assert!(store.object("a.b").is_some());
        assert!(store.record("a.b").is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_state_typed_patches_only_on_divergence() {
        let (store, tools) = setup();
        let mut common = text("b");
        common.unit = Some("°C".to_string());
        tools.ensure_state_legacy("a.b", Some(common), json!("keep"));

        let desired = TypedState::new("value", ValueType::Number, Access::ReadOnly).with_default(0);
        tools.ensure_state_typed("a.b", desired.clone()).await;
        assert_eq!(store.patch_count(), 1);

        let obj = store.object("a.b").unwrap();
        assert_eq!(obj.common.role.as_deref(), Some("value"));
        assert_eq!(obj.common.value_type, Some(ValueType::Number));
        assert_eq!(obj.common.write, Some(false));
        assert_eq!(obj.common.unit.as_deref(), Some("°C"));
        assert_eq!(obj.common.name, "b");
        assert_eq!(store.value("a.b"), Some(json!("keep")));

        tools.ensure_state_typed("a.b", desired).await;
        assert_eq!(store.patch_count(), 1);
    }

    #[tokio::test]
    async fn test_ensure_state_typed_failure_is_swallowed() {
        let (store, tools) = setup();
        store.fail_on("a.b");
        tools
            .ensure_state_typed("a.b", TypedState::new("text", ValueType::String, Access::ReadOnly))
            .await;

        assert!(store.object("a.b").is_none());
        assert_eq!(tools.diagnostics()[0].function, "ensure_state_typed");
    }

    #[tokio::test]
    async fn test_ensure_state_dispatch() {
        let (store, tools) = setup();
        tools
            .ensure_state(
                "a.legacy",
                EnsureState::Legacy {
                    common: None,
                    initial: json!("init"),
                },
            )
            .await;
        tools
            .ensure_state(
                "a.typed",
                EnsureState::Typed(TypedState::new("switch", ValueType::Boolean, Access::ReadWrite)),
            )
            .await;

        assert_eq!(store.value("a.legacy"), Some(json!("init")));
        let typed = store.object("a.typed").unwrap();
        assert_eq!(typed.common.role.as_deref(), Some("switch"));
        assert_eq!(typed.common.write, Some(true));
    }
}
