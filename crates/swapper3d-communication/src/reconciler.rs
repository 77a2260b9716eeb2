//! Device event reconciliation
//!
//! Push events are applied in arrival order, each on its own. There is no
//! sequence number on the wire; the state store's revision is what keeps a
//! view from rendering an older snapshot over a newer one.

use std::sync::Arc;

use swapper3d_core::{ActivityLog, ConnectionState, LoadedInsert, PanelError, PanelResult, StateStore};

use crate::command::CommandRequest;
use crate::connection::ConnectionController;
use crate::push::{PluginMessage, PushEvent, PushEventKind};

/// Result of applying one push event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Whether the event was addressed to this plugin and handled
    pub applied: bool,
    /// Requests the event asks the client to send next
    pub follow_ups: Vec<CommandRequest>,
}

impl Reconciliation {
    fn ignored() -> Self {
        Self::default()
    }

    fn applied() -> Self {
        Self {
            applied: true,
            follow_ups: Vec::new(),
        }
    }
}

pub struct EventReconciler {
    plugin_id: String,
    connection: Arc<ConnectionController>,
    store: Arc<StateStore>,
    log: ActivityLog,
}

impl EventReconciler {
    pub(crate) fn new(
        plugin_id: impl Into<String>,
        connection: Arc<ConnectionController>,
        store: Arc<StateStore>,
        log: ActivityLog,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            connection,
            store,
            log,
        }
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// Apply one push event
    ///
    /// Events for other plugins are ignored without a trace in the log.
    pub fn on_device_event(&self, plugin_id: &str, event: &PushEvent) -> PanelResult<Reconciliation> {
        if plugin_id != self.plugin_id {
            return Ok(Reconciliation::ignored());
        }

        match event.kind() {
            PushEventKind::Log => {
                self.log.append(event.message.clone());
            }
            PushEventKind::ConnectionState => {
                self.connection.apply_device_connection_state(&event.message)?;
            }
            PushEventKind::CurrentlyLoadedInsert => {
                if !self.apply_loaded_insert(&event.message) {
                    return Ok(Reconciliation::ignored());
                }
            }
            PushEventKind::FirmwareVersion => {
                let version = event.message.trim().to_string();
                tracing::info!(%version, "installed firmware reported");
                self.store
                    .update(|s| s.firmware.installed_version = Some(version));
                return Ok(Reconciliation {
                    applied: true,
                    follow_ups: vec![CommandRequest::latest_firmware_version()],
                });
            }
            PushEventKind::LatestFirmwareVersion => {
                let version = event.message.trim().to_string();
                let updated = self
                    .store
                    .update(|s| s.firmware.latest_version = Some(version));
                if let Some(state) = updated {
                    if state.firmware.update_available() == Some(true) {
                        self.log.append(format!(
                            "Firmware update available: {} -> {}",
                            state.firmware.installed_version.unwrap_or_default(),
                            state.firmware.latest_version.unwrap_or_default()
                        ));
                    }
                }
            }
            PushEventKind::Unknown(event_type) => {
                tracing::debug!(%event_type, "ignoring unhandled push event");
                return Ok(Reconciliation::ignored());
            }
        }

        Ok(Reconciliation::applied())
    }

    /// Parse a raw host envelope and apply it
    pub fn on_plugin_message_json(&self, json: &str) -> PanelResult<Reconciliation> {
        let message = PluginMessage::from_json(json)
            .map_err(|e| PanelError::other(format!("Malformed push message: {}", e)))?;
        self.on_device_event(&message.plugin, &message.data)
    }

    // Reports for a session that no longer exists are stale
    fn apply_loaded_insert(&self, message: &str) -> bool {
        let insert = LoadedInsert::from_device_message(message);
        if self.connection.state() == ConnectionState::Disconnected {
            tracing::debug!(%insert, "dropping insert report while disconnected");
            return false;
        }
        self.store.update(|s| s.loaded_insert = insert);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandPayload};
    use crate::report::OutcomeReporter;
    use crate::transport::{CommandTransport, TransportError};
    use async_trait::async_trait;
    use swapper3d_core::EventBus;

    struct AlwaysOk;

    #[async_trait]
    impl CommandTransport for AlwaysOk {
        async fn post_command(
            &self,
            _payload: &CommandPayload,
        ) -> Result<serde_json::Value, TransportError> {
            Ok(serde_json::json!({}))
        }
    }

    fn reconciler() -> (EventReconciler, Arc<StateStore>, ActivityLog) {
        let bus = Arc::new(EventBus::new());
        let log = ActivityLog::with_bus(bus.clone());
        let store = Arc::new(StateStore::new(bus.clone()));
        let reporter = OutcomeReporter::new(log.clone(), bus);
        let connection = Arc::new(ConnectionController::new(
            store.clone(),
            Arc::new(AlwaysOk),
            reporter,
        ));
        (
            EventReconciler::new("Swapper3D", connection, store.clone(), log.clone()),
            store,
            log,
        )
    }

    #[test]
    fn test_other_plugin_is_ignored() {
        let (reconciler, store, log) = reconciler();
        let outcome = reconciler
            .on_device_event("Octolapse", &PushEvent::new("log", "hello"))
            .unwrap();
        assert!(!outcome.applied);
        assert!(log.is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_log_event_is_appended() {
        let (reconciler, _, log) = reconciler();
        reconciler
            .on_device_event("Swapper3D", &PushEvent::new("log", "Homing complete"))
            .unwrap();
        assert_eq!(log.messages(), vec!["Homing complete".to_string()]);
    }

    #[test]
    fn test_firmware_version_asks_for_latest_once() {
        let (reconciler, store, _) = reconciler();
        let outcome = reconciler
            .on_device_event("Swapper3D", &PushEvent::new("firmwareVersion", "1.2.0"))
            .unwrap();
        assert!(outcome.applied);
        assert_eq!(outcome.follow_ups.len(), 1);
        assert_eq!(
            outcome.follow_ups[0].command(),
            Command::LatestFirmwareVersion
        );
        assert_eq!(
            store.snapshot().firmware.installed_version.as_deref(),
            Some("1.2.0")
        );
    }

    #[test]
    fn test_newer_firmware_is_logged() {
        let (reconciler, _, log) = reconciler();
        reconciler
            .on_device_event("Swapper3D", &PushEvent::new("firmwareVersion", "1.2.0"))
            .unwrap();
        reconciler
            .on_device_event(
                "Swapper3D",
                &PushEvent::new("latestFirmwareVersion", "1.3.0"),
            )
            .unwrap();
        assert_eq!(
            log.latest().map(|e| e.message),
            Some("Firmware update available: 1.2.0 -> 1.3.0".to_string())
        );
    }

    #[test]
    fn test_insert_report_dropped_while_disconnected() {
        let (reconciler, store, _) = reconciler();
        let outcome = reconciler
            .on_device_event("Swapper3D", &PushEvent::new("currentlyLoadedInsert", "2"))
            .unwrap();
        assert!(!outcome.applied);
        assert!(store.snapshot().loaded_insert.is_none());
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        let (reconciler, store, log) = reconciler();
        let outcome = reconciler
            .on_device_event("Swapper3D", &PushEvent::new("temperature", "210"))
            .unwrap();
        assert!(!outcome.applied);
        assert!(log.is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_malformed_envelope() {
        let (reconciler, _, _) = reconciler();
        assert!(reconciler.on_plugin_message_json("{not json").is_err());
    }
}
