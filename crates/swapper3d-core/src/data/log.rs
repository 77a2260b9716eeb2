//! Activity log shown to the user
//!
//! Append-only, ordered, timestamped. Growth is unbounded for the length of
//! a session; the view is expected to scroll to the newest line.

use chrono::{DateTime, Local};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::event_bus::{EventBus, PanelEvent};

/// One line of the activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Sequence number within the session, starting at 0
    pub index: usize,
    /// When the line was appended
    pub timestamp: DateTime<Local>,
    /// Human readable text
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Shared, append-only log sink
///
/// Cloning is cheap; clones append to the same log.
#[derive(Clone)]
pub struct ActivityLog {
    entries: Arc<RwLock<Vec<LogEntry>>>,
    bus: Option<Arc<EventBus>>,
}

impl ActivityLog {
    /// Create a log that is not attached to any event bus
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            bus: None,
        }
    }

    /// Create a log that announces every appended line on `bus`
    pub fn with_bus(bus: Arc<EventBus>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            bus: Some(bus),
        }
    }

    /// Append a line and return it
    pub fn append(&self, message: impl Into<String>) -> LogEntry {
        let entry = {
            let mut entries = self.entries.write();
            let entry = LogEntry {
                index: entries.len(),
                timestamp: Local::now(),
                message: message.into(),
            };
            entries.push(entry.clone());
            entry
        };

        tracing::debug!(target: "swapper3d::activity", "{}", entry.message);

        if let Some(bus) = &self.bus {
            bus.publish(PanelEvent::Log(entry.clone()));
        }

        entry
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Newest line, the one a view should be scrolled to
    pub fn latest(&self) -> Option<LogEntry> {
        self.entries.read().last().cloned()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().clone()
    }

    /// Messages only, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .map(|entry| entry.message.clone())
            .collect()
    }

    /// Lines appended at or after `index`
    pub fn since(&self, index: usize) -> Vec<LogEntry> {
        self.entries
            .read()
            .iter()
            .skip(index)
            .cloned()
            .collect()
    }

    /// Whole log as newline-terminated text, the way the panel displays it
    pub fn to_text(&self) -> String {
        self.entries
            .read()
            .iter()
            .map(|entry| format!("{}\n", entry.message))
            .collect()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityLog")
            .field("entries", &self.len())
            .field("attached", &self.bus.is_some())
            .finish()
    }
}
