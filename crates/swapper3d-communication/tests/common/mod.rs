//! Shared fixtures for the panel integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use swapper3d_communication::{
    CommandPayload, CommandTransport, PushEvent, SwapperPanel, TransportError, DEFAULT_PLUGIN_ID,
};

/// Transport that records every payload and answers from a script
///
/// Unscripted calls succeed.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<CommandPayload>>,
    script: Mutex<VecDeque<Result<serde_json::Value, TransportError>>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the next call with `body` as the response body
    pub fn fail_next(&self, status: u16, body: &str) {
        self.script.lock().push_back(Err(TransportError::Status {
            status,
            body: body.to_string(),
        }));
    }

    pub fn sent(&self) -> Vec<CommandPayload> {
        self.sent.lock().clone()
    }

    pub fn sent_commands(&self) -> Vec<String> {
        self.sent.lock().iter().map(|p| p.command.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl CommandTransport for RecordingTransport {
    async fn post_command(
        &self,
        payload: &CommandPayload,
    ) -> Result<serde_json::Value, TransportError> {
        self.sent.lock().push(payload.clone());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(serde_json::json!({})))
    }
}

pub fn panel() -> (SwapperPanel, Arc<RecordingTransport>) {
    let transport = RecordingTransport::new();
    let panel = SwapperPanel::new(DEFAULT_PLUGIN_ID, transport.clone());
    (panel, transport)
}

pub fn device(event_type: &str, message: &str) -> PushEvent {
    PushEvent::new(event_type, message)
}

/// Connect and let the device confirm
pub async fn connected_panel() -> (SwapperPanel, Arc<RecordingTransport>) {
    let (panel, transport) = panel();
    panel.connect().await.unwrap();
    panel
        .handle_push(DEFAULT_PLUGIN_ID, &device("connectionState", "Connected"))
        .await
        .unwrap();
    (panel, transport)
}

/// Number of log lines equal to `line`
pub fn count_lines(panel: &SwapperPanel, line: &str) -> usize {
    panel
        .log()
        .messages()
        .iter()
        .filter(|m| m.as_str() == line)
        .count()
}
