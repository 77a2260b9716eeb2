//! Command vocabulary and wire payloads
//!
//! Commands are posted to the host's plugin command endpoint as
//! `{"command": <name>, "insert_number"?: <int>, "message"?: <string>}`.

use serde::{Deserialize, Serialize};
use std::fmt;

use swapper3d_core::{PanelError, PanelResult};

/// Every command the host plugin understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Open the serial session and handshake with the device
    Connect,
    /// Close the serial session
    Disconnect,
    /// Unload the mounted insert
    Unload,
    /// Swap to the insert given by `insert_number` (zero-based)
    LoadInsert,
    /// Enter bore-alignment mode
    BoreAlignOn,
    /// Leave bore-alignment mode
    BoreAlignOff,
    /// Ask the host for the newest published firmware version
    LatestFirmwareVersion,
    /// Write a free-form line to the device
    Send,
}

impl Command {
    pub const ALL: [Command; 8] = [
        Command::Connect,
        Command::Disconnect,
        Command::Unload,
        Command::LoadInsert,
        Command::BoreAlignOn,
        Command::BoreAlignOff,
        Command::LatestFirmwareVersion,
        Command::Send,
    ];

    /// Name used on the wire
    pub fn wire_name(&self) -> &'static str {
        match self {
            Command::Connect => "connect",
            Command::Disconnect => "disconnect",
            Command::Unload => "unload",
            Command::LoadInsert => "load_insert",
            Command::BoreAlignOn => "borealignon",
            Command::BoreAlignOff => "borealignoff",
            Command::LatestFirmwareVersion => "get latest firmware version",
            Command::Send => "send",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Command::ALL
            .into_iter()
            .find(|command| command.wire_name() == name)
    }

    /// Whether the device must be connected for this command to be sent
    ///
    /// Connect and disconnect drive the lifecycle itself and are always legal.
    pub fn requires_connection(&self) -> bool {
        !matches!(self, Command::Connect | Command::Disconnect)
    }

    /// Wire name with its first letter upper-cased, as shown in the log
    pub fn display_name(&self) -> String {
        capitalize(self.wire_name())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// JSON body posted to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPayload {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A single command about to be transmitted
///
/// `insert_number` is present iff the command is `load_insert`, and is
/// never negative. `message` is present iff the command is `send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    command: Command,
    insert_number: Option<u32>,
    message: Option<String>,
}

impl CommandRequest {
    /// Build a request, enforcing the argument rules for `command`
    pub fn new(command: Command, insert_number: Option<i32>) -> PanelResult<Self> {
        match (command, insert_number) {
            (Command::LoadInsert, Some(index)) => {
                let index = u32::try_from(index).map_err(|_| PanelError::InvalidInsertIdentifier {
                    raw: index.to_string(),
                })?;
                Ok(Self::load_insert(index))
            }
            (Command::LoadInsert, None) => Err(PanelError::InvalidInsertIdentifier {
                raw: String::new(),
            }),
            (Command::Send, _) => Err(PanelError::other("send requires a message line")),
            (command, Some(_)) => Err(PanelError::other(format!(
                "{} does not take an insert number",
                command
            ))),
            (command, None) => Ok(Self::simple(command)),
        }
    }

    fn simple(command: Command) -> Self {
        Self {
            command,
            insert_number: None,
            message: None,
        }
    }

    pub fn connect() -> Self {
        Self::simple(Command::Connect)
    }

    pub fn disconnect() -> Self {
        Self::simple(Command::Disconnect)
    }

    pub fn load_insert(index: u32) -> Self {
        Self {
            command: Command::LoadInsert,
            insert_number: Some(index),
            message: None,
        }
    }

    pub fn latest_firmware_version() -> Self {
        Self::simple(Command::LatestFirmwareVersion)
    }

    /// Free-form line for the device
    pub fn raw_line(message: impl Into<String>) -> Self {
        Self {
            command: Command::Send,
            insert_number: None,
            message: Some(message.into()),
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn insert_number(&self) -> Option<u32> {
        self.insert_number
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Wire body; a zero insert number is sent like any other
    pub fn payload(&self) -> CommandPayload {
        CommandPayload {
            command: self.command.wire_name().to_string(),
            insert_number: self.insert_number,
            message: self.message.clone(),
        }
    }

    /// Log line for a host acknowledgment
    pub fn success_line(&self) -> String {
        format!("{} command successful", self.command.display_name())
    }

    /// Log line for a failure, with the raw body appended verbatim
    pub fn failure_line(&self, body: &str) -> String {
        format!("{} command failed: {}", self.command.display_name(), body)
    }
}

impl fmt::Display for CommandRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.insert_number, &self.message) {
            (Some(index), _) => write!(f, "{} {}", self.command, index),
            (None, Some(message)) => write!(f, "{} {:?}", self.command, message),
            (None, None) => write!(f, "{}", self.command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_names_round_trip() {
        for command in Command::ALL {
            assert_eq!(Command::from_wire(command.wire_name()), Some(command));
        }
        assert_eq!(Command::from_wire("explode"), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Command::Connect.display_name(), "Connect");
        assert_eq!(Command::LoadInsert.display_name(), "Load_insert");
        assert_eq!(
            Command::LatestFirmwareVersion.display_name(),
            "Get latest firmware version"
        );
    }

    #[test]
    fn test_requires_connection() {
        assert!(!Command::Connect.requires_connection());
        assert!(!Command::Disconnect.requires_connection());
        assert!(Command::LatestFirmwareVersion.requires_connection());
        assert!(Command::Unload.requires_connection());
        assert!(Command::BoreAlignOn.requires_connection());
        assert!(Command::Send.requires_connection());
    }

    #[test]
    fn test_payload_shape() {
        let body = serde_json::to_value(CommandRequest::connect().payload()).unwrap();
        assert_eq!(body, json!({"command": "connect"}));

        let body = serde_json::to_value(CommandRequest::load_insert(4).payload()).unwrap();
        assert_eq!(body, json!({"command": "load_insert", "insert_number": 4}));

        let body = serde_json::to_value(CommandRequest::raw_line("M118 hi").payload()).unwrap();
        assert_eq!(body, json!({"command": "send", "message": "M118 hi"}));
    }

    #[test]
    fn test_zero_insert_number_is_sent() {
        let body = serde_json::to_value(CommandRequest::load_insert(0).payload()).unwrap();
        assert_eq!(body, json!({"command": "load_insert", "insert_number": 0}));
    }

    #[test]
    fn test_new_enforces_arguments() {
        assert!(CommandRequest::new(Command::LoadInsert, Some(2)).is_ok());
        assert!(matches!(
            CommandRequest::new(Command::LoadInsert, Some(-1)),
            Err(PanelError::InvalidInsertIdentifier { .. })
        ));
        assert!(CommandRequest::new(Command::LoadInsert, None).is_err());
        assert!(CommandRequest::new(Command::Unload, Some(1)).is_err());
        assert!(CommandRequest::new(Command::Send, None).is_err());
        assert_eq!(
            CommandRequest::new(Command::BoreAlignOff, None).unwrap(),
            CommandRequest::simple(Command::BoreAlignOff)
        );
    }

    #[test]
    fn test_outcome_lines() {
        let request = CommandRequest::new(Command::Unload, None).unwrap();
        assert_eq!(request.success_line(), "Unload command successful");
        assert_eq!(
            request.failure_line("{\"error\": \"jammed\"}"),
            "Unload command failed: {\"error\": \"jammed\"}"
        );
    }
}
