//! Event type definitions for the event bus.
//!
//! Events carry full values (snapshots, log lines) so subscribers never need
//! to read back into the store to render them.

use serde::{Deserialize, Serialize};

use crate::data::{LogEntry, PanelState};

/// Root event enum for everything the panel announces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelEvent {
    /// Session state changed; carries the new snapshot
    StateChanged(PanelState),
    /// A line was appended to the activity log
    Log(LogEntry),
    /// Host acknowledged a command
    CommandCompleted {
        /// Wire name of the command.
        command: String,
    },
    /// Host rejected a command or could not be reached
    CommandFailed {
        /// Wire name of the command.
        command: String,
        /// Raw error body.
        body: String,
    },
    /// Command was refused locally and never transmitted
    CommandRejected {
        /// Wire name of the command.
        command: String,
        /// Why it was refused.
        reason: String,
    },
}

impl PanelEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            PanelEvent::StateChanged(_) => EventCategory::State,
            PanelEvent::Log(_) => EventCategory::Log,
            PanelEvent::CommandCompleted { .. }
            | PanelEvent::CommandFailed { .. }
            | PanelEvent::CommandRejected { .. } => EventCategory::Command,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            PanelEvent::StateChanged(state) => format!(
                "State r{}: {} / insert {}",
                state.revision,
                state.connection_label(),
                state.loaded_insert
            ),
            PanelEvent::Log(entry) => format!("Log #{}: {}", entry.index, entry.message),
            PanelEvent::CommandCompleted { command } => format!("{} completed", command),
            PanelEvent::CommandFailed { command, body } => {
                format!("{} failed: {}", command, body)
            }
            PanelEvent::CommandRejected { command, reason } => {
                format!("{} rejected: {}", command, reason)
            }
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// State snapshots.
    State,
    /// Activity log lines.
    Log,
    /// Command outcomes.
    Command,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::State => write!(f, "State"),
            EventCategory::Log => write!(f, "Log"),
            EventCategory::Command => write!(f, "Command"),
        }
    }
}
