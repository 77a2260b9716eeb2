//! Session data model
//!
//! The single source of truth for what the panel shows: connection state,
//! the insert currently mounted, firmware versions and the activity log.
//! Everything here lives in memory for the duration of one session.

pub mod firmware;
pub mod log;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PanelError, PanelResult};

pub use firmware::{FirmwareInfo, FirmwareVersion};
pub use log::{ActivityLog, LogEntry};

/// Connection lifecycle of the device session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No serial session with the device.
    #[default]
    Disconnected,
    /// A connect request was issued and the device has not confirmed it yet.
    Connecting,
    /// The device confirmed the session.
    Connected,
}

impl ConnectionState {
    /// Whether commands other than connect/disconnect may be sent
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
        }
    }
}

/// Connection label as reported by the device
///
/// The device speaks in richer labels than the three-state lifecycle. Each
/// label maps onto exactly one [`ConnectionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceStatus {
    /// `Disconnected`
    Disconnected,
    /// `Connecting`
    Connecting,
    /// `Connected`: handshake finished, device still settling.
    Connected,
    /// `Ready to Swap!`
    ReadyToSwap,
    /// `Bore alignment ON`
    BoreAlignmentOn,
}

impl DeviceStatus {
    /// Parse a raw device label, rejecting anything unrecognized
    pub fn parse(raw: &str) -> PanelResult<Self> {
        match raw.trim() {
            "Disconnected" => Ok(DeviceStatus::Disconnected),
            "Connecting" => Ok(DeviceStatus::Connecting),
            "Connected" => Ok(DeviceStatus::Connected),
            "Ready to Swap!" => Ok(DeviceStatus::ReadyToSwap),
            "Bore alignment ON" => Ok(DeviceStatus::BoreAlignmentOn),
            _ => Err(PanelError::UnknownConnectionState {
                raw: raw.to_string(),
            }),
        }
    }

    /// The lifecycle state this label implies
    pub fn connection_state(&self) -> ConnectionState {
        match self {
            DeviceStatus::Disconnected => ConnectionState::Disconnected,
            DeviceStatus::Connecting => ConnectionState::Connecting,
            DeviceStatus::Connected | DeviceStatus::ReadyToSwap | DeviceStatus::BoreAlignmentOn => {
                ConnectionState::Connected
            }
        }
    }

    /// Whether the device is in bore-alignment mode
    pub fn bore_alignment(&self) -> bool {
        matches!(self, DeviceStatus::BoreAlignmentOn)
    }

    /// The label exactly as the device sends it
    pub fn label(&self) -> &'static str {
        match self {
            DeviceStatus::Disconnected => "Disconnected",
            DeviceStatus::Connecting => "Connecting",
            DeviceStatus::Connected => "Connected",
            DeviceStatus::ReadyToSwap => "Ready to Swap!",
            DeviceStatus::BoreAlignmentOn => "Bore alignment ON",
        }
    }
}

impl FromStr for DeviceStatus {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceStatus::parse(s)
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Insert currently mounted in the swapper
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadedInsert {
    /// Nothing mounted, or not known since the last disconnect/unload.
    #[default]
    None,
    /// Insert as identified by the device.
    Insert(String),
}

impl LoadedInsert {
    /// Interpret a `currentlyLoadedInsert` message from the device
    pub fn from_device_message(message: &str) -> Self {
        let message = message.trim();
        if message.is_empty() || message.eq_ignore_ascii_case("none") {
            LoadedInsert::None
        } else {
            LoadedInsert::Insert(message.to_string())
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, LoadedInsert::None)
    }
}

impl fmt::Display for LoadedInsert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadedInsert::None => write!(f, "None"),
            LoadedInsert::Insert(label) => write!(f, "{}", label),
        }
    }
}

/// Snapshot of everything the panel displays
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PanelState {
    /// Connection lifecycle
    pub connection: ConnectionState,
    /// Last label reported by the device, if any since the last reset
    pub device_status: Option<DeviceStatus>,
    /// Insert currently mounted
    pub loaded_insert: LoadedInsert,
    /// Installed and latest firmware versions
    pub firmware: FirmwareInfo,
    /// Bumped by one on every effective mutation
    pub revision: u64,
}

impl PanelState {
    pub fn bore_alignment(&self) -> bool {
        self.device_status
            .map(|status| status.bore_alignment())
            .unwrap_or(false)
    }

    /// Label suitable for the connection-state display
    pub fn connection_label(&self) -> String {
        match self.device_status {
            Some(status) if status.connection_state() == self.connection => {
                status.label().to_string()
            }
            _ => self.connection.to_string(),
        }
    }
}
