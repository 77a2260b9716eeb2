//! Command dispatch
//!
//! Gate, transmit, report. Connect and disconnect are handed to the
//! [`ConnectionController`] so the lifecycle rules apply however they are
//! issued. Callers are responsible for not double-submitting.

use std::sync::Arc;

use swapper3d_core::{LoadedInsert, PanelError, PanelResult, StateStore};

use crate::command::{Command, CommandRequest};
use crate::connection::ConnectionController;
use crate::insert::InsertSelector;
use crate::report::OutcomeReporter;
use crate::transport::{transmit, CommandTransport};

pub struct CommandDispatcher {
    connection: Arc<ConnectionController>,
    store: Arc<StateStore>,
    transport: Arc<dyn CommandTransport>,
    reporter: OutcomeReporter,
}

impl CommandDispatcher {
    pub(crate) fn new(
        connection: Arc<ConnectionController>,
        store: Arc<StateStore>,
        transport: Arc<dyn CommandTransport>,
        reporter: OutcomeReporter,
    ) -> Self {
        Self {
            connection,
            store,
            transport,
            reporter,
        }
    }

    /// Build and send a command
    ///
    /// Arguments are validated for every command, connect and disconnect
    /// included, before anything is sent.
    pub async fn send(&self, command: Command, insert_number: Option<i32>) -> PanelResult<()> {
        let request = match CommandRequest::new(command, insert_number) {
            Ok(request) => request,
            Err(error) => {
                self.reporter.rejected(command, &error);
                return Err(error);
            }
        };
        self.dispatch(request).await
    }

    /// Send an already built request
    pub async fn dispatch(&self, request: CommandRequest) -> PanelResult<()> {
        match request.command() {
            Command::Connect => return self.connection.request_connect().await,
            Command::Disconnect => return self.connection.request_disconnect().await,
            _ => {}
        }

        if let Err(error) = self.connection.check_permitted(request.command()) {
            self.reporter.rejected(request.command(), &error);
            return Err(error);
        }

        match transmit(self.transport.as_ref(), &request).await {
            Ok(_) => {
                self.reporter.completed(&request);
                self.apply_acknowledged(&request);
                Ok(())
            }
            Err(error) => {
                self.reporter.failed(&request, &error);
                Err(error)
            }
        }
    }

    /// Swap to the insert the user picked (1-based)
    pub async fn load_insert(&self, raw: &str) -> PanelResult<()> {
        let index = match InsertSelector::select_insert(raw) {
            Ok(index) => index,
            Err(error) => {
                self.reporter.rejected(Command::LoadInsert, &error);
                return Err(error);
            }
        };
        if index < 0 {
            let error = PanelError::InvalidInsertIdentifier {
                raw: raw.to_string(),
            };
            self.reporter.rejected(Command::LoadInsert, &error);
            return Err(error);
        }

        self.reporter
            .log()
            .append(format!("Swap to insert requested: {}", index));
        self.send(Command::LoadInsert, Some(index)).await
    }

    /// Write a free-form line to the device
    pub async fn send_raw(&self, line: &str) -> PanelResult<()> {
        self.dispatch(CommandRequest::raw_line(line)).await
    }

    pub async fn query_latest_firmware(&self) -> PanelResult<()> {
        self.dispatch(CommandRequest::latest_firmware_version()).await
    }

    fn apply_acknowledged(&self, request: &CommandRequest) {
        if request.command() == Command::Unload {
            self.store.update(|s| s.loaded_insert = LoadedInsert::None);
        }
    }
}
