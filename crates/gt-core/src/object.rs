//! Object metadata: the `common` descriptor and the object envelope

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Declared value type of a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
    Boolean,
    Array,
    Object,
    Json,
    File,
    #[default]
    Mixed,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Json => "json",
            ValueType::File => "file",
            ValueType::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// Whether scripts may write a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    #[default]
    ReadOnly,
    ReadWrite,
}

impl Access {
    /// The `write` flag this access level maps to
    pub fn writable(self) -> bool {
        self == Access::ReadWrite
    }
}

/// Kind of an object in the host namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    State,
    Channel,
    Device,
    Folder,
}

/// The metadata descriptor of an object (`common`)
///
/// Fields the helpers do not know about are kept in `extra` so that a
/// metadata patch never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StateCommon {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Semantic role (e.g., "text", "value.time", "state")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Declared value type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<bool>,

    /// Default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub def: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Any other fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StateCommon {
    /// Descriptor carrying only a name, as used for channels
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Descriptor for a state with the given role and type
    pub fn state(
        name: impl Into<String>,
        role: impl Into<String>,
        value_type: ValueType,
        access: Access,
    ) -> Self {
        Self {
            name: name.into(),
            role: Some(role.into()),
            value_type: Some(value_type),
            read: Some(true),
            write: Some(access.writable()),
            ..Default::default()
        }
    }

    /// Generic read/write descriptor used when no metadata is given
    pub fn mixed(name: impl Into<String>) -> Self {
        Self::state(name, "state", ValueType::Mixed, Access::ReadWrite)
    }

    /// Set the default value
    pub fn with_default(mut self, def: Value) -> Self {
        self.def = Some(def);
        self
    }

    /// Check whether role, type and read/write flags match the given shape
    pub fn has_shape(&self, role: &str, value_type: ValueType, access: Access) -> bool {
        self.role.as_deref() == Some(role)
            && self.value_type == Some(value_type)
            && self.read == Some(true)
            && self.write == Some(access.writable())
    }

    /// Copy of this descriptor with role, type and read/write flags replaced
    pub fn reshaped(&self, role: &str, value_type: ValueType, access: Access) -> Self {
        Self {
            role: Some(role.to_string()),
            value_type: Some(value_type),
            read: Some(true),
            write: Some(access.writable()),
            ..self.clone()
        }
    }
}

/// An object in the host namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostObject {
    #[serde(rename = "type")]
    pub kind: ObjectKind,

    #[serde(default)]
    pub common: StateCommon,

    #[serde(default)]
    pub native: Map<String, Value>,
}

impl HostObject {
    /// A state object with the given metadata
    pub fn state(common: StateCommon) -> Self {
        Self {
            kind: ObjectKind::State,
            common,
            native: Map::new(),
        }
    }

    /// A channel object with the given metadata
    pub fn channel(common: StateCommon) -> Self {
        Self {
            kind: ObjectKind::Channel,
            common,
            native: Map::new(),
        }
    }
}

/// Partial update applied to an existing object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common: Option<StateCommon>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<Map<String, Value>>,
}
