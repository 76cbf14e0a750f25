//! Tools configuration
//!
//! Parses the settings that were hard-coded constants in the scripts:
//! where heartbeat and chat states live, the default chat channel, and the
//! initial debug switch.
//!
//! ```yaml
//! heartbeat_root: 0_userdata.0.Scripte.Heartbeat
//! synochat_root: 0_userdata.0.Notifications.SynoChat
//! debug: false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use gt_core::StateId;

use crate::diagnostics::DEFAULT_MAX_ENTRIES;
use crate::error::{ConfigError, ConfigResult};

/// Default root of the heartbeat states
pub const DEFAULT_HEARTBEAT_ROOT: &str = "0_userdata.0.Scripte.Heartbeat";

/// Default root of the Synology Chat notification states
pub const DEFAULT_SYNOCHAT_ROOT: &str = "0_userdata.0.Notifications.SynoChat";

/// Configuration for a [`GlobalTools`](crate::GlobalTools) instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Root below which `<scriptKey>.{lastPing,status,lastMessage}` live
    #[serde(default = "default_heartbeat_root")]
    pub heartbeat_root: String,

    /// Root below which `<channel>.{send,title,sendFile,sendfile}` live
    #[serde(default = "default_synochat_root")]
    pub synochat_root: String,

    /// Initial value of the debug switch
    #[serde(default)]
    pub debug: bool,

    /// Prefix of the library's own warnings
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,

    /// Channel used when a notification names none
    #[serde(default = "default_channel")]
    pub default_channel: String,

    /// Capacity of the default diagnostic log
    #[serde(default = "default_max_diagnostics")]
    pub max_diagnostics: usize,
}

fn default_heartbeat_root() -> String {
    DEFAULT_HEARTBEAT_ROOT.to_string()
}

fn default_synochat_root() -> String {
    DEFAULT_SYNOCHAT_ROOT.to_string()
}

fn default_log_prefix() -> String {
    "GlobalTools".to_string()
}

fn default_channel() -> String {
    "System".to_string()
}

fn default_max_diagnostics() -> usize {
    DEFAULT_MAX_ENTRIES
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            heartbeat_root: default_heartbeat_root(),
            synochat_root: default_synochat_root(),
            debug: false,
            log_prefix: default_log_prefix(),
            default_channel: default_channel(),
            max_diagnostics: default_max_diagnostics(),
        }
    }
}

impl ToolsConfig {
    /// Parse from a YAML string
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(content).map_err(|source| ConfigError::ParseYaml { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    fn validate(&self) -> ConfigResult<()> {
        for (key, root) in [
            ("heartbeat_root", &self.heartbeat_root),
            ("synochat_root", &self.synochat_root),
        ] {
            root.parse::<StateId>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
        }
        if self.log_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "log_prefix".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.default_channel.is_empty() || self.default_channel.contains('.') {
            return Err(ConfigError::InvalidValue {
                key: "default_channel".to_string(),
                reason: "must be a single id segment".to_string(),
            });
        }
        if self.max_diagnostics == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_diagnostics".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
