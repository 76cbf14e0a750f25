//! The tool set bound to one host

use std::sync::Arc;

use gt_core::{StateId, StateIdError};
use gt_state_store::StateHost;

use crate::config::ToolsConfig;
use crate::diagnostics::{DiagnosticEntry, DiagnosticLog, DiagnosticSink};
use crate::logging::{LogLevel, Logger};

/// Helper functions bound to a host store
///
/// One instance per script (or per test) keeps its own debug switch and
/// diagnostics. Operations never fail: host errors are logged as warnings,
/// reported to the diagnostic sink, and replaced by a fallback or a no-op.
pub struct GlobalTools<H: StateHost> {
    pub(crate) host: Arc<H>,
    pub(crate) logger: Logger,
    pub(crate) config: ToolsConfig,
}

impl<H: StateHost> GlobalTools<H> {
    /// Create a tool set with default configuration
    pub fn new(host: Arc<H>) -> Self {
        Self::with_config(host, ToolsConfig::default())
    }

    /// Create a tool set reporting to a fresh [`DiagnosticLog`]
    pub fn with_config(host: Arc<H>, config: ToolsConfig) -> Self {
        let sink = Arc::new(DiagnosticLog::with_capacity(config.max_diagnostics));
        Self::with_sink(host, config, sink)
    }

    /// Create a tool set reporting to the given sink
    pub fn with_sink(host: Arc<H>, config: ToolsConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        let logger = Logger::new(config.log_prefix.clone(), config.debug, sink);
        Self {
            host,
            logger,
            config,
        }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Entries held by the diagnostic sink
    pub fn diagnostics(&self) -> Vec<DiagnosticEntry> {
        self.logger.sink().entries()
    }

    /// Log `[prefix] message` at the given level
    pub fn log(&self, prefix: &str, message: &str, level: LogLevel) {
        self.logger.log(prefix, message, level);
    }

    /// Log at debug level if debug output is enabled
    pub fn log_debug(&self, prefix: &str, message: &str) {
        self.logger.log_debug(prefix, message);
    }

    pub fn set_debug_enabled(&self, enabled: bool) {
        self.logger.set_debug_enabled(enabled);
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.logger.is_debug_enabled()
    }

    /// `<root>.<path>` as a validated id string
    pub(crate) fn child_id(root: &str, path: &str) -> Result<String, StateIdError> {
        Ok(root.parse::<StateId>()?.child(path)?.to_string())
    }

    pub(crate) fn warn(&self, function: &str, id: &str, err: &dyn std::fmt::Display) {
        self.logger.warn_failure(function, id, err);
    }
}
