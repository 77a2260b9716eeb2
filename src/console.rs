//! Line commands for the interactive console

use std::fmt;

use swapper3d_communication::{PluginMessage, SwapperPanel};
use swapper3d_core::{PanelEvent, PanelResult, PanelState};

pub const HELP: &str = "\
commands:
  connect | disconnect | unload
  swap <n>            load insert n (1-based)
  bore on|off         toggle bore alignment
  send <line>         write a raw line to the device
  push <json>         inject a host push message
  status | log | help | quit";

/// One parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Connect,
    Disconnect,
    Unload,
    Swap(String),
    BoreAlignment(bool),
    Send(String),
    Push(String),
    Status,
    Log,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

impl ConsoleCommand {
    /// Parse a line; `Ok(None)` for blank input
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match (word.to_ascii_lowercase().as_str(), rest) {
            ("connect", "") => ConsoleCommand::Connect,
            ("disconnect", "") => ConsoleCommand::Disconnect,
            ("unload", "") => ConsoleCommand::Unload,
            ("swap", insert) if !insert.is_empty() => ConsoleCommand::Swap(insert.to_string()),
            ("bore", "on") => ConsoleCommand::BoreAlignment(true),
            ("bore", "off") => ConsoleCommand::BoreAlignment(false),
            ("send", text) if !text.is_empty() => ConsoleCommand::Send(text.to_string()),
            ("push", json) if !json.is_empty() => ConsoleCommand::Push(json.to_string()),
            ("status", "") => ConsoleCommand::Status,
            ("log", "") => ConsoleCommand::Log,
            ("help", "") | ("?", "") => ConsoleCommand::Help,
            ("quit", "") | ("exit", "") => ConsoleCommand::Quit,
            _ => return Err(ParseError(format!("unrecognized command: {}", line))),
        };
        Ok(Some(command))
    }
}

/// Run one console command against the panel
///
/// Failures are already in the activity log; the error is returned so the
/// caller can decide whether to echo it.
pub async fn execute(panel: &SwapperPanel, command: &ConsoleCommand) -> PanelResult<Option<String>> {
    match command {
        ConsoleCommand::Connect => panel.connect().await?,
        ConsoleCommand::Disconnect => panel.disconnect().await?,
        ConsoleCommand::Unload => panel.unload().await?,
        ConsoleCommand::Swap(insert) => panel.swap_to_insert(insert).await?,
        ConsoleCommand::BoreAlignment(on) => panel.bore_alignment(*on).await?,
        ConsoleCommand::Send(line) => panel.send_line(line).await?,
        ConsoleCommand::Push(json) => {
            let message = PluginMessage::from_json(json).map_err(|e| {
                swapper3d_core::PanelError::other(format!("Malformed push message: {}", e))
            })?;
            panel.handle_plugin_message(&message).await?;
        }
        ConsoleCommand::Status => return Ok(Some(describe_state(&panel.snapshot()))),
        ConsoleCommand::Log => return Ok(Some(panel.log().to_text())),
        ConsoleCommand::Help => return Ok(Some(HELP.to_string())),
        ConsoleCommand::Quit => {}
    }
    Ok(None)
}

/// Multi-line summary of a state snapshot
pub fn describe_state(state: &PanelState) -> String {
    let firmware = match (
        &state.firmware.installed_version,
        &state.firmware.latest_version,
    ) {
        (Some(installed), Some(latest)) => format!("{} (latest {})", installed, latest),
        (Some(installed), None) => installed.clone(),
        (None, _) => "unknown".to_string(),
    };
    format!(
        "connection: {}\ninsert: {}\nbore alignment: {}\nfirmware: {}\nrevision: {}",
        state.connection_label(),
        state.loaded_insert,
        if state.bore_alignment() { "on" } else { "off" },
        firmware,
        state.revision
    )
}

/// One-line rendering of a bus event for the console
pub fn render_event(event: &PanelEvent) -> Option<String> {
    match event {
        PanelEvent::Log(entry) => Some(entry.to_string()),
        PanelEvent::StateChanged(state) => Some(format!(
            "[state r{}] {} | insert {}",
            state.revision,
            state.connection_label(),
            state.loaded_insert
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use swapper3d_communication::{CommandPayload, CommandTransport, TransportError};
    use swapper3d_core::ConnectionState;

    struct Acknowledge;

    #[async_trait]
    impl CommandTransport for Acknowledge {
        async fn post_command(
            &self,
            _payload: &CommandPayload,
        ) -> Result<serde_json::Value, TransportError> {
            Ok(serde_json::json!({}))
        }
    }

    async fn run(panel: &SwapperPanel, line: &str) -> Option<String> {
        let command = ConsoleCommand::parse(line).unwrap().unwrap();
        execute(panel, &command).await.unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleCommand::parse("  "), Ok(None));
        assert_eq!(
            ConsoleCommand::parse("connect"),
            Ok(Some(ConsoleCommand::Connect))
        );
        assert_eq!(
            ConsoleCommand::parse("swap 3"),
            Ok(Some(ConsoleCommand::Swap("3".to_string())))
        );
        assert_eq!(
            ConsoleCommand::parse("BORE off"),
            Ok(Some(ConsoleCommand::BoreAlignment(false)))
        );
        assert_eq!(
            ConsoleCommand::parse("send M118 hello world"),
            Ok(Some(ConsoleCommand::Send("M118 hello world".to_string())))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ConsoleCommand::parse("swap").is_err());
        assert!(ConsoleCommand::parse("bore sideways").is_err());
        assert!(ConsoleCommand::parse("connect now").is_err());
        assert!(ConsoleCommand::parse("launch").is_err());
    }

    #[test]
    fn test_describe_default_state() {
        let text = describe_state(&PanelState::default());
        assert!(text.contains("insert: None"));
        assert!(text.contains("firmware: unknown"));
        assert!(text.contains("revision: 0"));
    }

    #[tokio::test]
    async fn test_console_session() {
        let panel = SwapperPanel::new("Swapper3D", Arc::new(Acknowledge));

        run(&panel, "connect").await;
        run(
            &panel,
            r#"push {"plugin": "Swapper3D", "data": {"type": "connectionState", "message": "Ready to Swap!"}}"#,
        )
        .await;
        assert_eq!(panel.connection_state(), ConnectionState::Connected);

        run(&panel, "swap 2").await;
        let status = run(&panel, "status").await.unwrap();
        assert!(status.contains("connection: Ready to Swap!"));

        let log = run(&panel, "log").await.unwrap();
        assert!(log.contains("Load_insert command successful"));
    }

    #[tokio::test]
    async fn test_refusals_come_back_as_errors() {
        let panel = SwapperPanel::new("Swapper3D", Arc::new(Acknowledge));
        let command = ConsoleCommand::parse("unload").unwrap().unwrap();
        let error = execute(&panel, &command).await.unwrap_err();
        assert!(error.is_precondition_violation());
    }

    #[tokio::test]
    async fn test_malformed_push_is_an_error() {
        let panel = SwapperPanel::new("Swapper3D", Arc::new(Acknowledge));
        let command = ConsoleCommand::Push("{not json".to_string());
        assert!(execute(&panel, &command).await.is_err());
    }
}
