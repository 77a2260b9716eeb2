//! Push messages from the host
//!
//! The host's message bus delivers `(plugin, {type, message})` pairs. The
//! JSON envelope is `{"plugin": "...", "data": {"type": "...", "message": ...}}`.

use serde::{Deserialize, Deserializer, Serialize};

/// Kind of push event, taken from the `type` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEventKind {
    Log,
    ConnectionState,
    CurrentlyLoadedInsert,
    FirmwareVersion,
    LatestFirmwareVersion,
    /// Any type this client does not handle
    Unknown(String),
}

impl PushEventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "log" => PushEventKind::Log,
            "connectionState" => PushEventKind::ConnectionState,
            "currentlyLoadedInsert" => PushEventKind::CurrentlyLoadedInsert,
            "firmwareVersion" => PushEventKind::FirmwareVersion,
            "latestFirmwareVersion" => PushEventKind::LatestFirmwareVersion,
            other => PushEventKind::Unknown(other.to_string()),
        }
    }
}

/// Payload of one push message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, deserialize_with = "message_text")]
    pub message: String,
}

impl PushEvent {
    pub fn new(event_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> PushEventKind {
        PushEventKind::from_type(&self.event_type)
    }
}

/// Full envelope as delivered by the host bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMessage {
    pub plugin: String,
    pub data: PushEvent,
}

impl PluginMessage {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// The host stringifies most messages but not all (insert numbers arrive as
// strings from some versions and integers from others).
fn message_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
