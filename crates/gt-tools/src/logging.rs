//! Prefix-tagged logging
//!
//! Every line goes through `tracing` as `[<prefix>] <message>`. The debug
//! switch belongs to the [`Logger`] instance, so independent tool sets (and
//! parallel tests) never share it.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Log level for emitted lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl std::str::FromStr for LogLevel {
    type Err = ();

    /// Convert from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" | "silly" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Format a log line the way every helper prints it
pub fn format_line(prefix: &str, message: &str) -> String {
    format!("[{}] {}", prefix, message)
}

/// Logger with an instance-local debug switch
pub struct Logger {
    /// Prefix used for the library's own warnings
    prefix: String,
    debug: AtomicBool,
    sink: Arc<dyn DiagnosticSink>,
}

impl Logger {
    pub fn new(prefix: impl Into<String>, debug: bool, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            prefix: prefix.into(),
            debug: AtomicBool::new(debug),
            sink,
        }
    }

    /// Emit one line at the given level
    pub fn log(&self, prefix: &str, message: &str, level: LogLevel) {
        let line = format_line(prefix, message);
        match level {
            LogLevel::Debug => debug!(target: "gt_tools", "{}", line),
            LogLevel::Info => info!(target: "gt_tools", "{}", line),
            LogLevel::Warning => warn!(target: "gt_tools", "{}", line),
            LogLevel::Error => error!(target: "gt_tools", "{}", line),
        }
    }

    /// Emit at debug level, only while debug output is enabled
    pub fn log_debug(&self, prefix: &str, message: &str) {
        if self.is_debug_enabled() {
            self.log(prefix, message, LogLevel::Debug);
        }
    }

    pub fn set_debug_enabled(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Report a swallowed failure: one warning line plus a diagnostic
    pub fn warn_failure(&self, function: &str, id: &str, err: &dyn fmt::Display) {
        let diagnostic = Diagnostic::warning(function, id, err.to_string());
        self.log(&self.prefix, &diagnostic.to_string(), LogLevel::Warning);
        self.sink.record(diagnostic);
    }

    /// The diagnostic sink failures are reported to
    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        &self.sink
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("prefix", &self.prefix)
            .field("debug", &self.is_debug_enabled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticLog, NullSink};

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("Info".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("silly".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_log_level_serde() {
        let level: LogLevel = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(level, LogLevel::Warning);
        assert_eq!(serde_json::to_string(&LogLevel::Error).unwrap(), "\"error\"");
    }

    #[test]
    fn test_format_line() {
        assert_eq!(format_line("UniFi", "connected"), "[UniFi] connected");
    }

    #[test]
    fn test_debug_flag_is_per_instance() {
        let a = Logger::new("GlobalTools", false, Arc::new(NullSink));
        let b = Logger::new("GlobalTools", true, Arc::new(NullSink));

        a.set_debug_enabled(true);
        b.set_debug_enabled(false);
        assert!(a.is_debug_enabled());
        assert!(!b.is_debug_enabled());
    }

    #[test]
    fn test_warn_failure_records_diagnostic() {
        let log = Arc::new(DiagnosticLog::new());
        let logger = Logger::new("GlobalTools", false, log.clone());

        logger.warn_failure("set_state_safe", "a.b", &"store offline");
        let entry = log.find("set_state_safe", "a.b").unwrap();
        assert_eq!(entry.last_message(), Some("store offline"));
        assert_eq!(entry.level, LogLevel::Warning);
    }
}
