//! Connection lifecycle
//!
//! Disconnected → Connecting happens on a connect request. Connecting →
//! Connected happens only when the device says so. Any state → Disconnected
//! happens on an acknowledged disconnect or a device report.
//!
//! A device report that would jump straight from Disconnected to a connected
//! label is treated as stale and dropped: only this client's own connect
//! request opens the path to Connected.

use std::sync::Arc;

use swapper3d_core::{
    ConnectionState, DeviceStatus, LoadedInsert, PanelError, PanelResult, StateStore,
};

use crate::command::{Command, CommandRequest};
use crate::report::OutcomeReporter;
use crate::transport::{transmit, CommandTransport};

/// What a device connection report did to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State or label changed
    Applied {
        from: ConnectionState,
        status: DeviceStatus,
    },
    /// Same state and label as before
    Unchanged,
    /// Report contradicts the local lifecycle and was dropped
    IgnoredStale {
        current: ConnectionState,
        reported: DeviceStatus,
    },
}

/// Owner of the connection lifecycle
pub struct ConnectionController {
    store: Arc<StateStore>,
    transport: Arc<dyn CommandTransport>,
    reporter: OutcomeReporter,
}

impl ConnectionController {
    pub(crate) fn new(
        store: Arc<StateStore>,
        transport: Arc<dyn CommandTransport>,
        reporter: OutcomeReporter,
    ) -> Self {
        Self {
            store,
            transport,
            reporter,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.store.read(|s| s.connection)
    }

    /// Whether `command` may be transmitted right now
    pub fn permits(&self, command: Command) -> bool {
        !command.requires_connection() || self.state().is_connected()
    }

    pub fn check_permitted(&self, command: Command) -> PanelResult<()> {
        if self.permits(command) {
            Ok(())
        } else {
            Err(PanelError::PreconditionViolation {
                command: command.wire_name().to_string(),
                state: self.state(),
            })
        }
    }

    /// Start a session with the device
    ///
    /// Refused while a session exists or a connect is already pending. On
    /// acknowledgment the state stays Connecting until the device reports
    /// in; on failure it falls back to Disconnected.
    pub async fn request_connect(&self) -> PanelResult<()> {
        let mut blocked = None;
        self.store.update(|s| {
            if s.connection == ConnectionState::Disconnected {
                s.connection = ConnectionState::Connecting;
                s.device_status = None;
            } else {
                blocked = Some(s.connection);
            }
        });

        if let Some(state) = blocked {
            let error = PanelError::PreconditionViolation {
                command: Command::Connect.wire_name().to_string(),
                state,
            };
            self.reporter.rejected(Command::Connect, &error);
            return Err(error);
        }
        self.log_transition(ConnectionState::Disconnected, ConnectionState::Connecting.to_string());

        let request = CommandRequest::connect();
        match transmit(self.transport.as_ref(), &request).await {
            Ok(_) => {
                self.reporter.completed(&request);
                Ok(())
            }
            Err(error) => {
                self.reporter.failed(&request, &error);
                let reverted = self.store.update(|s| {
                    if s.connection == ConnectionState::Connecting {
                        s.connection = ConnectionState::Disconnected;
                    }
                });
                if reverted.is_some() {
                    self.log_transition(
                        ConnectionState::Connecting,
                        ConnectionState::Disconnected.to_string(),
                    );
                }
                Err(error)
            }
        }
    }

    /// End the session; legal from any state
    pub async fn request_disconnect(&self) -> PanelResult<()> {
        let request = CommandRequest::disconnect();
        match transmit(self.transport.as_ref(), &request).await {
            Ok(_) => {
                self.reporter.completed(&request);
                self.mark_disconnected();
                Ok(())
            }
            Err(error) => {
                self.reporter.failed(&request, &error);
                Err(error)
            }
        }
    }

    /// Apply a `connectionState` report from the device
    ///
    /// Idempotent. Unknown labels are rejected and leave the state alone.
    pub fn apply_device_connection_state(&self, raw: &str) -> PanelResult<Transition> {
        let status = match DeviceStatus::parse(raw) {
            Ok(status) => status,
            Err(error) => {
                tracing::warn!("unknown connection state {:?}", raw);
                self.reporter
                    .log()
                    .append(format!("Ignoring unknown connection state from device: {:?}", raw));
                return Err(error);
            }
        };

        let target = status.connection_state();
        let mut outcome = Transition::Unchanged;
        self.store.update(|s| {
            let from = s.connection;
            let stale = match target {
                ConnectionState::Connected => from == ConnectionState::Disconnected,
                ConnectionState::Connecting => from == ConnectionState::Connected,
                ConnectionState::Disconnected => false,
            };
            if stale {
                outcome = Transition::IgnoredStale {
                    current: from,
                    reported: status,
                };
                return;
            }
            if from == target && s.device_status == Some(status) {
                return;
            }

            s.connection = target;
            s.device_status = Some(status);
            if target == ConnectionState::Disconnected {
                s.loaded_insert = LoadedInsert::None;
            }
            outcome = Transition::Applied { from, status };
        });

        match outcome {
            Transition::Applied { from, status } => {
                self.log_transition(from, status.label().to_string());
            }
            Transition::IgnoredStale { current, reported } => {
                tracing::debug!(%current, %reported, "dropping stale connection report");
                self.reporter.log().append(format!(
                    "Ignoring stale connection state {:?} while {}",
                    reported.label(),
                    current
                ));
            }
            Transition::Unchanged => {}
        }

        Ok(outcome)
    }

    fn mark_disconnected(&self) {
        let from = self.state();
        let changed = self.store.update(|s| {
            s.connection = ConnectionState::Disconnected;
            s.device_status = Some(DeviceStatus::Disconnected);
            s.loaded_insert = LoadedInsert::None;
        });
        if changed.is_some() && from != ConnectionState::Disconnected {
            self.log_transition(from, ConnectionState::Disconnected.to_string());
        }
    }

    fn log_transition(&self, from: ConnectionState, label: String) {
        tracing::info!(%from, to = %label, "connection state changed");
        if from.to_string() == label {
            self.reporter.log().append(format!("Swapper3D status: {}", label));
        } else {
            self.reporter
                .log()
                .append(format!("Swapper3D connection: {} -> {}", from, label));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandPayload;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use swapper3d_core::{ActivityLog, EventBus};

    struct AlwaysOk;

    #[async_trait]
    impl CommandTransport for AlwaysOk {
        async fn post_command(
            &self,
            _payload: &CommandPayload,
        ) -> Result<serde_json::Value, TransportError> {
            Ok(serde_json::json!({"result": "True"}))
        }
    }

    fn controller() -> (ConnectionController, ActivityLog) {
        let bus = Arc::new(EventBus::new());
        let log = ActivityLog::with_bus(bus.clone());
        let store = Arc::new(StateStore::new(bus.clone()));
        let reporter = OutcomeReporter::new(log.clone(), bus);
        (
            ConnectionController::new(store, Arc::new(AlwaysOk), reporter),
            log,
        )
    }

    #[test]
    fn test_permits() {
        let (controller, _) = controller();
        assert!(controller.permits(Command::Connect));
        assert!(!controller.permits(Command::LatestFirmwareVersion));
        assert!(!controller.permits(Command::Unload));
        assert!(matches!(
            controller.check_permitted(Command::BoreAlignOn),
            Err(PanelError::PreconditionViolation { .. })
        ));
    }

    #[test]
    fn test_stale_connected_report_is_dropped() {
        let (controller, log) = controller();
        let outcome = controller
            .apply_device_connection_state("Ready to Swap!")
            .unwrap();
        assert_eq!(
            outcome,
            Transition::IgnoredStale {
                current: ConnectionState::Disconnected,
                reported: DeviceStatus::ReadyToSwap,
            }
        );
        assert_eq!(controller.state(), ConnectionState::Disconnected);
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_connect_then_device_confirms() {
        let (controller, _) = controller();
        controller.request_connect().await.unwrap();
        assert_eq!(controller.state(), ConnectionState::Connecting);

        let outcome = controller.apply_device_connection_state("Connected").unwrap();
        assert_eq!(
            outcome,
            Transition::Applied {
                from: ConnectionState::Connecting,
                status: DeviceStatus::Connected,
            }
        );
        assert_eq!(controller.state(), ConnectionState::Connected);

        assert_eq!(
            controller.apply_device_connection_state("Connected").unwrap(),
            Transition::Unchanged
        );
    }
}
