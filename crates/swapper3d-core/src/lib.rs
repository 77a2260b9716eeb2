//! # Swapper3D Core
//!
//! Core types for the Swapper3D control panel: the session data model, the
//! observable state store, the activity log, the event bus and the error
//! taxonomy shared by every other crate.

pub mod data;
pub mod error;
pub mod event_bus;
pub mod store;
pub mod types;

pub use data::{
    ActivityLog, ConnectionState, DeviceStatus, FirmwareInfo, FirmwareVersion, LoadedInsert,
    LogEntry, PanelState,
};

pub use error::{PanelError, PanelResult};

pub use event_bus::{
    EventBus, EventBusConfig, EventCategory, EventFilter, PanelEvent, SubscriptionId,
};

pub use store::StateStore;

pub use types::{thread_safe_rw, ThreadSafeRw};
