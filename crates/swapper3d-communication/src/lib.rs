//! # Swapper3D Communication
//!
//! The command/connection protocol between the panel and the Swapper3D
//! device, as relayed by the print server's plugin endpoint:
//! - Command vocabulary and wire payloads
//! - Host transport (HTTP)
//! - Connection lifecycle, command dispatch and push-event reconciliation
//! - A facade tying them to one session

pub mod command;
pub mod connection;
pub mod dispatcher;
pub mod insert;
pub mod panel;
pub mod push;
pub mod reconciler;
mod report;
pub mod transport;

pub use command::{Command, CommandPayload, CommandRequest};
pub use connection::{ConnectionController, Transition};
pub use dispatcher::CommandDispatcher;
pub use insert::InsertSelector;
pub use panel::{SwapperPanel, DEFAULT_PLUGIN_ID};
pub use push::{PluginMessage, PushEvent, PushEventKind};
pub use reconciler::{EventReconciler, Reconciliation};
pub use transport::{CommandTransport, HttpTransport, HttpTransportConfig, TransportError};
