//! Outcome reporting shared by the controller and the dispatcher
//!
//! Each outcome produces exactly one activity-log line and one bus event.

use std::sync::Arc;

use swapper3d_core::{ActivityLog, EventBus, PanelError, PanelEvent};

use crate::command::{Command, CommandRequest};

#[derive(Clone)]
pub(crate) struct OutcomeReporter {
    log: ActivityLog,
    bus: Arc<EventBus>,
}

impl OutcomeReporter {
    pub(crate) fn new(log: ActivityLog, bus: Arc<EventBus>) -> Self {
        Self { log, bus }
    }

    pub(crate) fn completed(&self, request: &CommandRequest) {
        tracing::info!(command = %request, "command acknowledged");
        self.log.append(request.success_line());
        self.bus.publish(PanelEvent::CommandCompleted {
            command: request.command().wire_name().to_string(),
        });
    }

    pub(crate) fn failed(&self, request: &CommandRequest, error: &PanelError) {
        let body = match error.transport_body() {
            Some(body) => body.to_string(),
            None => error.to_string(),
        };
        self.log.append(request.failure_line(&body));
        self.bus.publish(PanelEvent::CommandFailed {
            command: request.command().wire_name().to_string(),
            body,
        });
    }

    /// Refused locally; nothing was transmitted
    pub(crate) fn rejected(&self, command: Command, error: &PanelError) {
        tracing::warn!(%command, "command not sent: {}", error);
        self.log
            .append(format!("{} command not sent: {}", command.display_name(), error));
        self.bus.publish(PanelEvent::CommandRejected {
            command: command.wire_name().to_string(),
            reason: error.to_string(),
        });
    }

    pub(crate) fn log(&self) -> &ActivityLog {
        &self.log
    }
}
