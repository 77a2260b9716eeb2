//! Panel facade
//!
//! Wires the controller, dispatcher and reconciler of one session to a
//! single transport, state store and activity log, and exposes the actions
//! the panel offers.

use std::sync::Arc;

use swapper3d_core::{
    ActivityLog, ConnectionState, EventBus, PanelResult, PanelState, StateStore, SubscriptionId,
};

use crate::command::Command;
use crate::connection::ConnectionController;
use crate::dispatcher::CommandDispatcher;
use crate::push::{PluginMessage, PushEvent};
use crate::reconciler::{EventReconciler, Reconciliation};
use crate::report::OutcomeReporter;
use crate::transport::CommandTransport;

/// Plugin identifier the host uses for Swapper3D
pub const DEFAULT_PLUGIN_ID: &str = "Swapper3D";

pub struct SwapperPanel {
    bus: Arc<EventBus>,
    store: Arc<StateStore>,
    log: ActivityLog,
    connection: Arc<ConnectionController>,
    dispatcher: CommandDispatcher,
    reconciler: EventReconciler,
}

impl SwapperPanel {
    pub fn new(plugin_id: impl Into<String>, transport: Arc<dyn CommandTransport>) -> Self {
        Self::with_bus(plugin_id, transport, Arc::new(EventBus::new()))
    }

    /// Build a panel publishing on an existing bus
    pub fn with_bus(
        plugin_id: impl Into<String>,
        transport: Arc<dyn CommandTransport>,
        bus: Arc<EventBus>,
    ) -> Self {
        let store = Arc::new(StateStore::new(bus.clone()));
        let log = ActivityLog::with_bus(bus.clone());
        let reporter = OutcomeReporter::new(log.clone(), bus.clone());

        let connection = Arc::new(ConnectionController::new(
            store.clone(),
            transport.clone(),
            reporter.clone(),
        ));
        let dispatcher =
            CommandDispatcher::new(connection.clone(), store.clone(), transport, reporter);
        let reconciler =
            EventReconciler::new(plugin_id, connection.clone(), store.clone(), log.clone());

        Self {
            bus,
            store,
            log,
            connection,
            dispatcher,
            reconciler,
        }
    }

    pub async fn connect(&self) -> PanelResult<()> {
        self.log.append("Connect requested");
        self.connection.request_connect().await
    }

    pub async fn disconnect(&self) -> PanelResult<()> {
        self.log.append("Disconnect requested");
        self.connection.request_disconnect().await
    }

    pub async fn unload(&self) -> PanelResult<()> {
        self.log.append("Unload requested");
        self.dispatcher.send(Command::Unload, None).await
    }

    /// Swap to a 1-based insert identifier as picked in the panel
    pub async fn swap_to_insert(&self, raw: &str) -> PanelResult<()> {
        self.dispatcher.load_insert(raw).await
    }

    pub async fn bore_alignment(&self, on: bool) -> PanelResult<()> {
        let command = if on {
            Command::BoreAlignOn
        } else {
            Command::BoreAlignOff
        };
        self.log.append(format!(
            "Bore alignment {} requested",
            if on { "on" } else { "off" }
        ));
        self.dispatcher.send(command, None).await
    }

    /// Write a free-form line to the device
    pub async fn send_line(&self, line: &str) -> PanelResult<()> {
        self.dispatcher.send_raw(line).await
    }

    /// Apply a push event and send whatever it asks for next
    ///
    /// Follow-up failures are already in the activity log and do not fail
    /// the event itself.
    pub async fn handle_push(
        &self,
        plugin_id: &str,
        event: &PushEvent,
    ) -> PanelResult<Reconciliation> {
        let reconciliation = self.reconciler.on_device_event(plugin_id, event)?;
        for request in &reconciliation.follow_ups {
            if let Err(error) = self.dispatcher.dispatch(request.clone()).await {
                tracing::warn!(command = %request, "follow-up failed: {}", error);
            }
        }
        Ok(reconciliation)
    }

    pub async fn handle_plugin_message(&self, message: &PluginMessage) -> PanelResult<Reconciliation> {
        self.handle_push(&message.plugin, &message.data).await
    }

    pub fn snapshot(&self) -> PanelState {
        self.store.snapshot()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Call `observer` with every new state snapshot
    pub fn observe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(PanelState) + Send + Sync + 'static,
    {
        self.store.observe(observer)
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn connection(&self) -> &ConnectionController {
        &self.connection
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn reconciler(&self) -> &EventReconciler {
        &self.reconciler
    }
}
