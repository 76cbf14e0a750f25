//! Diagnostics for swallowed failures
//!
//! The helpers never return errors to scripts. Every failure they absorb is
//! still reported here as a [`Diagnostic`], so tests and monitoring can see
//! what the log line said without scraping log output.
//!
//! ## Features
//! - Deduplicates repeated failures by (function, id)
//! - Stores up to 5 unique messages per entry
//! - Configurable max entries (default: 50), oldest evicted first

use std::collections::VecDeque;
use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Default maximum number of entries to store
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Maximum number of unique messages to store per entry
const MAX_MESSAGES_PER_ENTRY: usize = 5;

/// A single swallowed failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Helper that absorbed the failure (e.g., "ensure_channel")
    pub function: String,
    /// State or object id the helper was working on
    pub id: String,
    pub level: LogLevel,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(function: &str, id: &str, message: impl Into<String>) -> Self {
        Self {
            function: function.to_string(),
            id: id.to_string(),
            level: LogLevel::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error in {}({}): {}", self.function, self.id, self.message)
    }
}

/// A deduplicated diagnostic with occurrence tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    pub function: String,
    pub id: String,
    pub level: LogLevel,
    /// Unique messages (max 5, oldest dropped first)
    pub messages: VecDeque<String>,
    /// Number of occurrences
    pub count: u64,
    pub first_occurred: DateTime<Utc>,
    /// Most recent occurrence
    pub timestamp: DateTime<Utc>,
}

impl DiagnosticEntry {
    fn new(diagnostic: Diagnostic) -> Self {
        let now = Utc::now();
        let mut messages = VecDeque::with_capacity(MAX_MESSAGES_PER_ENTRY);
        messages.push_back(diagnostic.message);
        Self {
            function: diagnostic.function,
            id: diagnostic.id,
            level: diagnostic.level,
            messages,
            count: 1,
            first_occurred: now,
            timestamp: now,
        }
    }

    fn matches(&self, diagnostic: &Diagnostic) -> bool {
        self.function == diagnostic.function && self.id == diagnostic.id
    }

    fn update(&mut self, diagnostic: Diagnostic) {
        self.count += 1;
        self.timestamp = Utc::now();
        self.level = diagnostic.level;

        if !self.messages.contains(&diagnostic.message) {
            if self.messages.len() >= MAX_MESSAGES_PER_ENTRY {
                self.messages.pop_front();
            }
            self.messages.push_back(diagnostic.message);
        }
    }

    /// Most recent message
    pub fn last_message(&self) -> Option<&str> {
        self.messages.back().map(String::as_str)
    }
}

/// Receiver of swallowed failures
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);

    /// Snapshot of stored entries, oldest first; sinks that keep nothing return none
    fn entries(&self) -> Vec<DiagnosticEntry> {
        Vec::new()
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _diagnostic: Diagnostic) {}
}

/// Thread-safe, bounded, deduplicating diagnostic store
#[derive(Debug)]
pub struct DiagnosticLog {
    /// Entries in order of last occurrence (most recent last)
    entries: RwLock<Vec<DiagnosticEntry>>,
    max_entries: usize,
}

impl DiagnosticLog {
    /// Create a log holding at most DEFAULT_MAX_ENTRIES entries
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// Create a log holding at most `max_entries` entries
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Clear all entries
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the entry for a (function, id) pair
    pub fn find(&self, function: &str, id: &str) -> Option<DiagnosticEntry> {
        self.entries.read().ok().and_then(|entries| {
            entries
                .iter()
                .find(|e| e.function == function && e.id == id)
                .cloned()
        })
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn record(&self, diagnostic: Diagnostic) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        match entries.iter().position(|e| e.matches(&diagnostic)) {
            Some(idx) => {
                // Move to end (most recent)
                let mut existing = entries.remove(idx);
                existing.update(diagnostic);
                entries.push(existing);
            }
            None => {
                entries.push(DiagnosticEntry::new(diagnostic));
                if entries.len() > self.max_entries {
                    let excess = entries.len() - self.max_entries;
                    entries.drain(..excess);
                }
            }
        }
    }

    fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries.read().map(|e| e.clone()).unwrap_or_default()
    }
}
